// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Program and verify a single pad
//!
//! Both formatters walk the same states:
//!
//! ```text
//! Idle -> Queried -> SetIssued -> ReadBack -> Verified
//!                                          \-> Failed
//! ```
//!
//! Any step may end in `Failed`. There is no way back to `Idle`, no retry, and
//! nothing is undone on failure.

use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::command::{self, CommandLine, Tools};
use crate::pad::{Resolution, SubdevicePad, VideoPad};
use crate::parser::{self, ParseFailure, ReportedFormat};
use crate::runner::{CommandOutput, CommandRunner};
use crate::Error;

const BANNER: &str = "===========================================";

/// Progress of one pad through the apply protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadState {
    /// Nothing issued yet
    Idle,
    /// Current format queried (informational)
    Queried,
    /// Set command accepted by the tool
    SetIssued,
    /// Resulting format read back
    ReadBack,
    /// Device reports exactly the requested format
    Verified,
    /// Aborted; terminal
    Failed,
}

impl PadState {
    /// Returns true for `Verified` and `Failed`
    pub fn is_terminal(self) -> bool {
        matches!(self, PadState::Verified | PadState::Failed)
    }
}

impl fmt::Display for PadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PadState::Idle => "idle",
            PadState::Queried => "queried",
            PadState::SetIssued => "set-issued",
            PadState::ReadBack => "read-back",
            PadState::Verified => "verified",
            PadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct Progress<'a> {
    pad: &'a str,
    state: PadState,
}

impl<'a> Progress<'a> {
    fn new(pad: &'a str) -> Self {
        Progress {
            pad,
            state: PadState::Idle,
        }
    }

    fn advance(&mut self, next: PadState) {
        debug_assert!(!self.state.is_terminal());
        log::debug!("{}: {} -> {}", self.pad, self.state, next);
        self.state = next;
    }

    /// Mark the pad failed on the error path of `result`
    fn check<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        if result.is_err() {
            self.advance(PadState::Failed);
        }
        result
    }
}

/// Outcome of comparing a read-back report with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Format and size match exactly
    Verified(ReportedFormat),
    /// The device settled on something else
    Mismatch(ReportedFormat),
    /// The tool output held no format report
    Unparsable(ParseFailure),
}

/// Compare a parsed report against the requested format and size.
///
/// Comparison is exact string equality; `1920X1080` does not match
/// `1920x1080`.
pub fn verify(
    parsed: Result<ReportedFormat, ParseFailure>,
    format: &str,
    resolution: Resolution,
) -> Verification {
    match parsed {
        Ok(reported) if reported.format == format && reported.dims == resolution.to_string() => {
            Verification::Verified(reported)
        }
        Ok(reported) => Verification::Mismatch(reported),
        Err(failure) => Verification::Unparsable(failure),
    }
}

/// A pad that reached [`PadState::Verified`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPad {
    /// Pad label, `NAME:PAD` for subdevice pads
    pub pad: String,
    /// Format the device reported after the set
    pub format: ReportedFormat,
}

/// Runs the apply protocol against one runner and progress sink
pub struct Session<R, W> {
    runner: R,
    out: W,
    tools: Tools,
}

impl<R: CommandRunner, W: Write> Session<R, W> {
    /// Create a session writing progress to `out`
    pub fn new(runner: R, out: W, tools: Tools) -> Self {
        Session { runner, out, tools }
    }

    /// Set the media-bus format of a subdevice pad and verify it with a read-back.
    ///
    /// Issues get, set, get against `media_device` (or the pad's own device
    /// override), in that order.
    pub fn apply_subdevice_format(
        &mut self,
        pad: &SubdevicePad,
        media_device: &Path,
    ) -> Result<AppliedPad, Error> {
        let label = format!("{}:{}", pad.name, pad.pad);
        let media_device = pad.device.as_deref().unwrap_or(media_device);
        let mut progress = Progress::new(&label);

        self.banner(&format!("{}, Pad {}", pad.name, pad.pad))?;

        let get = command::subdev_get(&self.tools, pad, media_device);
        progress.check(self.informational(&get))?;
        progress.advance(PadState::Queried);

        let set = command::subdev_set(&self.tools, pad, media_device);
        progress.check(self.checked(&set))?;
        progress.advance(PadState::SetIssued);

        let output = progress.check(self.checked(&get))?;
        progress.advance(PadState::ReadBack);

        let parsed = parser::parse_subdev_format(&output.text);
        let verification = verify(parsed, &pad.code, pad.resolution);
        let result = conclude(&label, pad.format_string(), verification, |r| {
            format!("{}/{}", r.format, r.dims)
        });
        let applied = progress.check(result)?;
        progress.advance(PadState::Verified);
        log::info!("{} set to {}", label, pad.format_string());
        Ok(applied)
    }

    /// Set the pixel format of a video node and verify what the tool reports.
    ///
    /// Issues an informational format enumeration, then the set; the set
    /// command's own output is the read-back.
    pub fn apply_video_format(&mut self, pad: &VideoPad) -> Result<AppliedPad, Error> {
        let mut progress = Progress::new(&pad.name);

        self.banner(&pad.name)?;

        let enumerate = command::video_enum(&self.tools, pad);
        progress.check(self.informational(&enumerate))?;
        progress.advance(PadState::Queried);

        let set = command::video_set(&self.tools, pad);
        let output = progress.check(self.checked(&set))?;
        progress.advance(PadState::SetIssued);

        let parsed = parser::parse_video_format(&output.text);
        progress.advance(PadState::ReadBack);

        let expected = format!("{} {}", pad.fmt, pad.resolution);
        let verification = verify(parsed, &pad.fmt, pad.resolution);
        let result = conclude(&pad.name, expected, verification, |r| r.to_string());
        let applied = progress.check(result)?;
        progress.check(writeln!(self.out).map_err(Error::from))?;
        progress.advance(PadState::Verified);
        log::info!("{} set to {} {}", pad.name, pad.fmt, pad.resolution);
        Ok(applied)
    }

    /// Print the media controller topology. Tool failures are logged, not returned.
    pub fn dump_topology(&mut self, media_device: &Path) -> Result<(), Error> {
        self.banner("SUMMARY")?;
        let dump = command::topology_dump(&self.tools, media_device);
        match self.execute(&dump) {
            Ok(output) if !output.success() => {
                log::warn!("{} exited with status {:?}", dump, output.code)
            }
            Ok(_) => {}
            Err(Error::Spawn { command, source }) => {
                log::warn!("Could not run {}: {}", command, source)
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    fn banner(&mut self, title: &str) -> Result<(), Error> {
        writeln!(self.out, "{}", BANNER)?;
        writeln!(self.out, "{}", title)?;
        writeln!(self.out, "{}", BANNER)?;
        Ok(())
    }

    /// Echo, run, and print the output of `cmd`
    fn execute(&mut self, cmd: &CommandLine) -> Result<CommandOutput, Error> {
        writeln!(self.out, ">{}", cmd)?;
        self.out.flush()?;

        let output = self.runner.run(cmd).map_err(|source| Error::Spawn {
            command: cmd.to_string(),
            source,
        })?;

        if !output.text.is_empty() {
            writeln!(self.out, "{}", output.text)?;
        }
        Ok(output)
    }

    /// Run a command whose result is only shown to the operator
    fn informational(&mut self, cmd: &CommandLine) -> Result<(), Error> {
        let output = self.execute(cmd)?;
        if !output.success() {
            log::warn!("{} exited with status {:?}", cmd, output.code);
        }
        Ok(())
    }

    /// Run a command that must exit successfully
    fn checked(&mut self, cmd: &CommandLine) -> Result<CommandOutput, Error> {
        let output = self.execute(cmd)?;
        if output.success() {
            Ok(output)
        } else {
            Err(Error::CommandFailed {
                command: cmd.to_string(),
                code: output.code,
                output: output.text,
            })
        }
    }
}

fn conclude(
    pad: &str,
    expected: String,
    verification: Verification,
    render: impl Fn(&ReportedFormat) -> String,
) -> Result<AppliedPad, Error> {
    let reported = match verification {
        Verification::Verified(format) => {
            return Ok(AppliedPad {
                pad: pad.to_string(),
                format,
            })
        }
        Verification::Mismatch(format) => render(&format),
        Verification::Unparsable(failure) => failure.to_string(),
    };
    Err(Error::FormatMismatch {
        pad: pad.to_string(),
        expected,
        reported,
    })
}

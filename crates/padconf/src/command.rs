// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! External tool invocations
//!
//! Commands are built as an argument vector and executed without a shell, so
//! pad names never pass through shell tokenization. The only quoting applied
//! is the one `media-ctl` itself expects: entity names are wrapped in single
//! quotes inside the pad specifier (`'ov5640 1-003c':0`).
//!
//! | Verb | Tool | Arguments |
//! |------|------|-----------|
//! | subdevice get | `media-ctl` | `[verbose] -d MDEV --get-v4l2 'NAME':PAD` |
//! | subdevice set | `media-ctl` | `[verbose] -d MDEV -V "'NAME':PAD [fmt:CODE/WxH]"` |
//! | enumerate | `yavta` | `--enum-formats DEV` |
//! | video set | `yavta` | `-f FMT -s WxH DEV` |
//! | topology dump | `media-ctl` | `-p -d MDEV` |

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pad::{SubdevicePad, VideoPad};

/// Executables used to program the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tools {
    /// Subdevice control tool
    #[serde(default = "Tools::default_media_ctl")]
    pub media_ctl: PathBuf,
    /// Video capture tool
    #[serde(default = "Tools::default_yavta")]
    pub yavta: PathBuf,
}

impl Tools {
    fn default_media_ctl() -> PathBuf {
        PathBuf::from("media-ctl")
    }

    fn default_yavta() -> PathBuf {
        PathBuf::from("yavta")
    }
}

impl Default for Tools {
    fn default() -> Self {
        Tools {
            media_ctl: Tools::default_media_ctl(),
            yavta: Tools::default_yavta(),
        }
    }
}

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandLine {
    /// Start a command for `program` with no arguments
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        CommandLine {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        self
    }

    /// Executable to run
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments, not including the program
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Build the matching [`std::process::Command`]
    pub fn to_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

/// Renders the command as a line that can be pasted into a POSIX shell.
impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_quote(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &OsStr) -> String {
    let arg = arg.to_string_lossy();
    let plain = |c: char| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c);

    if !arg.is_empty() && arg.chars().all(plain) {
        arg.into_owned()
    } else if !arg.contains('\'') {
        format!("'{}'", arg)
    } else if !arg.contains(['"', '$', '`', '\\', '!']) {
        format!("\"{}\"", arg)
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// `'NAME':PAD`, the entity/pad specifier understood by media-ctl
fn pad_specifier(pad: &SubdevicePad) -> String {
    format!("'{}':{}", pad.name, pad.pad)
}

fn media_ctl(tools: &Tools, pad: &SubdevicePad, media_device: &Path) -> CommandLine {
    let verbose = pad.verbose.as_deref().unwrap_or_default();
    CommandLine::new(&tools.media_ctl)
        .args(verbose.split_whitespace())
        .arg("-d")
        .arg(media_device)
}

/// Read the active format of a subdevice pad
pub fn subdev_get(tools: &Tools, pad: &SubdevicePad, media_device: &Path) -> CommandLine {
    media_ctl(tools, pad, media_device)
        .arg("--get-v4l2")
        .arg(pad_specifier(pad))
}

/// Program the media-bus code and size of a subdevice pad
pub fn subdev_set(tools: &Tools, pad: &SubdevicePad, media_device: &Path) -> CommandLine {
    media_ctl(tools, pad, media_device).arg("-V").arg(format!(
        "{} [fmt:{}]",
        pad_specifier(pad),
        pad.format_string()
    ))
}

/// List the pixel formats a video node supports
pub fn video_enum(tools: &Tools, pad: &VideoPad) -> CommandLine {
    CommandLine::new(&tools.yavta)
        .arg("--enum-formats")
        .arg(&pad.device)
}

/// Program the pixel format and size of a video node
pub fn video_set(tools: &Tools, pad: &VideoPad) -> CommandLine {
    CommandLine::new(&tools.yavta)
        .arg("-f")
        .arg(&pad.fmt)
        .arg("-s")
        .arg(pad.resolution.to_string())
        .arg(&pad.device)
}

/// Print the media controller topology
pub fn topology_dump(tools: &Tools, media_device: &Path) -> CommandLine {
    CommandLine::new(&tools.media_ctl)
        .arg("-p")
        .arg("-d")
        .arg(media_device)
}

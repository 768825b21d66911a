// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Apply a topology pad by pad
//!
//! The [`Dispatcher`] walks the pads in order, hands each to the matching
//! formatter and stops at the first failure. Pads applied before the failure
//! keep their new format.

use std::io::Write;
use std::path::PathBuf;

use crate::apply::{AppliedPad, Session};
use crate::command::Tools;
use crate::pad::PadDescriptor;
use crate::runner::CommandRunner;
use crate::Error;

/// Pads verified by a successful run, in application order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// One entry per pad
    pub pads: Vec<AppliedPad>,
}

/// Sequences pad formatters over a topology
pub struct Dispatcher<R, W> {
    session: Session<R, W>,
    media_device: PathBuf,
    summary: bool,
}

impl<R: CommandRunner, W: Write> Dispatcher<R, W> {
    /// Create a dispatcher for pads on `media_device`
    ///
    /// # Arguments
    ///
    /// * `runner` - Executes the external tools
    /// * `out` - Receives banners, command echoes and tool output
    /// * `media_device` - Media controller node for subdevice pads
    /// * `tools` - Tool executables
    pub fn new<P: Into<PathBuf>>(runner: R, out: W, media_device: P, tools: Tools) -> Self {
        Dispatcher {
            session: Session::new(runner, out, tools),
            media_device: media_device.into(),
            summary: true,
        }
    }

    /// Enable or disable the topology dump after a successful run
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Apply every pad, then print the resulting topology
    pub fn run(&mut self, pads: &[PadDescriptor]) -> Result<ApplyReport, Error> {
        let report = self.apply(pads)?;
        if self.summary {
            self.session.dump_topology(&self.media_device)?;
        }
        Ok(report)
    }

    /// Apply every pad in order, stopping at the first failure
    pub fn apply(&mut self, pads: &[PadDescriptor]) -> Result<ApplyReport, Error> {
        let mut report = ApplyReport::default();

        for (index, pad) in pads.iter().enumerate() {
            log::debug!("Applying pad {}/{}: {}", index + 1, pads.len(), pad);

            let applied = match pad {
                PadDescriptor::Subdevice(pad) => self
                    .session
                    .apply_subdevice_format(pad, &self.media_device),
                PadDescriptor::Video(pad) => self.session.apply_video_format(pad),
            };

            match applied {
                Ok(applied) => report.pads.push(applied),
                Err(err) => {
                    log::error!(
                        "Pad {}/{} ({}) failed, {} remaining pads skipped",
                        index + 1,
                        pads.len(),
                        pad,
                        pads.len() - index - 1
                    );
                    return Err(err);
                }
            }
        }

        Ok(report)
    }
}

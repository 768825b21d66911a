// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! padconf - media pipeline pad configuration for V4L2 devices
//!
//! Applies a declared media topology to the pads of a camera pipeline by
//! driving `media-ctl` (subdevice media-bus formats) and `yavta` (video
//! capture formats), then reads back what the driver actually accepted. Any
//! pad that does not settle into the requested format aborts the run.
//!
//! # Quick Start
//!
//! ```no_run
//! use padconf::config::Topology;
//! use padconf::dispatch::Dispatcher;
//! use padconf::runner::SystemRunner;
//!
//! let topology = Topology::load("imx8mp-ov5640.json")?;
//! let mut dispatcher = Dispatcher::new(
//!     SystemRunner,
//!     std::io::stdout(),
//!     topology.media_device.clone(),
//!     topology.tools.clone(),
//! );
//! let report = dispatcher.run(&topology.pads)?;
//! println!("{} pads verified", report.pads.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Sequencing
//!
//! Pads are applied strictly in document order, one external command at a
//! time. The first failure stops the run; pads that were already applied are
//! left as they are.

use std::{error, fmt, io};

/// Error type for topology loading and pad application
#[derive(Debug)]
pub enum Error {
    /// The topology document is missing, malformed, or describes an invalid pad
    InvalidConfig(String),

    /// An external tool exited with a non-zero status
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Combined tool output
        output: String,
    },

    /// An external tool could not be started
    Spawn {
        /// Rendered command line
        command: String,
        /// Underlying spawn error
        source: io::Error,
    },

    /// The device reported a format different from the requested one, or the
    /// report could not be parsed
    FormatMismatch {
        /// Name of the pad being verified
        pad: String,
        /// Requested `CODE/WxH` or `FMT WxH`
        expected: String,
        /// What the tool reported, or why it could not be read
        reported: String,
    },

    /// I/O error writing progress output
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidConfig(msg) => write!(f, "Invalid topology: {}", msg),
            Error::CommandFailed { command, code, .. } => match code {
                Some(code) => write!(f, "Command exited with status {}: {}", code, command),
                None => write!(f, "Command terminated by signal: {}", command),
            },
            Error::Spawn { command, source } => {
                write!(f, "Could not run command: {}: {}", command, source)
            }
            Error::FormatMismatch {
                pad,
                expected,
                reported,
            } => write!(
                f,
                "Could not apply format to {}: requested {}, device reports {}",
                pad, expected, reported
            ),
            Error::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Spawn { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            Error::InvalidConfig(_) | Error::CommandFailed { .. } | Error::FormatMismatch { .. } => {
                None
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// The pad module provides the typed pad descriptors.
pub mod pad;

/// The config module loads and validates topology documents.
pub mod config;

/// The command module builds external tool invocations.
pub mod command;

/// The runner module executes external tools.
pub mod runner;

/// The parser module reads formats back from tool output.
pub mod parser;

/// The apply module programs and verifies a single pad.
pub mod apply;

/// The dispatch module applies a whole topology in order.
pub mod dispatch;

pub use pad::{PadDescriptor, Resolution, SubdevicePad, VideoPad};

// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Pad descriptor types
//!
//! A topology is an ordered list of [`PadDescriptor`] values. The variant
//! decides which tool programs the pad:
//!
//! - [`PadDescriptor::Subdevice`] - media-bus format on a subdevice pad, via `media-ctl`
//! - [`PadDescriptor::Video`] - pixel format on a capture video node, via `yavta`

use std::fmt;
use std::path::PathBuf;

/// Frame size in pixels
///
/// # Example
///
/// ```
/// use padconf::Resolution;
///
/// let res = Resolution::new(1920, 1080);
/// assert_eq!(res.to_string(), "1920x1080");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Renders as `WIDTHxHEIGHT`, decimal with no padding. This is the exact
/// string both tools are expected to echo back.
impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A subdevice pad programmed with a media-bus code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubdevicePad {
    /// Entity name as reported by the media controller
    pub name: String,
    /// Pad index on the entity
    pub pad: u32,
    /// Media-bus code, e.g. `SBGGR10_1X10`
    pub code: String,
    /// Requested frame size
    pub resolution: Resolution,
    /// Extra flag handed to `media-ctl` (e.g. `-v`)
    pub verbose: Option<String>,
    /// Media device override; the run's media device is used when unset
    pub device: Option<PathBuf>,
}

impl SubdevicePad {
    /// `CODE/WxH` as written into and read back from the pad
    pub fn format_string(&self) -> String {
        format!("{}/{}", self.code, self.resolution)
    }
}

/// A plain video capture node programmed with a pixel format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPad {
    /// Label used in progress output
    pub name: String,
    /// Video device node, e.g. `/dev/video0`
    pub device: PathBuf,
    /// Pixel format (fourcc name as yavta prints it), e.g. `SBGGR8`
    pub fmt: String,
    /// Requested frame size
    pub resolution: Resolution,
}

/// One validated entry of a topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PadDescriptor {
    /// Media-bus formatted subdevice pad
    Subdevice(SubdevicePad),
    /// Pixel formatted video capture node
    Video(VideoPad),
}

impl fmt::Display for PadDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PadDescriptor::Subdevice(pad) => write!(f, "{}, Pad {}", pad.name, pad.pad),
            PadDescriptor::Video(pad) => write!(f, "{}", pad.name),
        }
    }
}

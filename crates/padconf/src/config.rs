// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Topology documents
//!
//! A topology is a JSON document listing the pads to program, in order:
//!
//! ```json
//! {
//!   "media_device": "/dev/media0",
//!   "pads": [
//!     { "name": "ov5640 1-003c", "pad": 0, "code": "UYVY8_2X8", "width": 1920, "height": 1080 },
//!     { "name": "capture", "device": "/dev/video0", "fmt": "UYVY", "width": 1920, "height": 1080 }
//!   ]
//! }
//! ```
//!
//! Records carrying `code` become [`SubdevicePad`]s, records carrying `fmt`
//! become [`VideoPad`]s. Every problem is reported as
//! [`Error::InvalidConfig`] before any device is touched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::command::Tools;
use crate::pad::{PadDescriptor, Resolution, SubdevicePad, VideoPad};
use crate::Error;

/// Media controller used when the document does not name one
pub const DEFAULT_MEDIA_DEVICE: &str = "/dev/media0";

/// A validated topology ready to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    /// Media controller device the subdevice pads live on
    pub media_device: PathBuf,
    /// External tool executables
    pub tools: Tools,
    /// Pads in application order, never empty
    pub pads: Vec<PadDescriptor>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    media_device: Option<PathBuf>,
    #[serde(default)]
    tools: Tools,
    pads: Option<Vec<PadRecord>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PadRecord {
    name: String,
    width: u32,
    height: u32,
    pad: Option<u32>,
    code: Option<String>,
    fmt: Option<String>,
    #[serde(alias = "dev")]
    device: Option<PathBuf>,
    verbose: Option<String>,
}

impl Topology {
    /// Read and validate a topology document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        log::debug!("Loading topology from {}", path.display());

        let text = fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;

        Self::from_json(&text)
            .map_err(|e| match e {
                Error::InvalidConfig(msg) => {
                    Error::InvalidConfig(format!("{}: {}", path.display(), msg))
                }
                other => other,
            })
    }

    /// Parse and validate a topology document
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let doc: Document =
            serde_json::from_str(text).map_err(|e| Error::InvalidConfig(e.to_string()))?;

        let records = match doc.pads {
            Some(records) if !records.is_empty() => records,
            _ => {
                return Err(Error::InvalidConfig(
                    "document doesn't define any pads".to_string(),
                ))
            }
        };

        let pads = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record.validate().map_err(|msg| {
                    Error::InvalidConfig(format!("pad #{}: {}", index + 1, msg))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Topology defines {} pads", pads.len());

        Ok(Topology {
            media_device: doc
                .media_device
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DEVICE)),
            tools: doc.tools,
            pads,
        })
    }
}

impl PadRecord {
    fn validate(self) -> Result<PadDescriptor, String> {
        if self.name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        // media-ctl reads a quoted entity name up to the next quote and has no escape
        if self.name.contains('\'') {
            return Err(format!("name {:?} must not contain a single quote", self.name));
        }
        if self.width == 0 || self.height == 0 {
            return Err(format!(
                "{}: width and height must be positive, got {}x{}",
                self.name, self.width, self.height
            ));
        }
        let resolution = Resolution::new(self.width, self.height);

        match (self.code, self.fmt) {
            (Some(code), None) => {
                check_token("code", &code)?;
                let pad = self
                    .pad
                    .ok_or_else(|| format!("{}: subdevice pad requires a pad index", self.name))?;
                Ok(PadDescriptor::Subdevice(SubdevicePad {
                    name: self.name,
                    pad,
                    code,
                    resolution,
                    verbose: self.verbose.filter(|v| !v.is_empty()),
                    device: self.device,
                }))
            }
            (None, Some(fmt)) => {
                check_token("fmt", &fmt)?;
                if self.pad.is_some() || self.verbose.is_some() {
                    return Err(format!(
                        "{}: pad and verbose only apply to subdevice pads",
                        self.name
                    ));
                }
                let device = self
                    .device
                    .ok_or_else(|| format!("{}: video pad requires a device", self.name))?;
                Ok(PadDescriptor::Video(VideoPad {
                    name: self.name,
                    device,
                    fmt,
                    resolution,
                }))
            }
            (Some(_), Some(_)) => Err(format!(
                "{}: code and fmt are mutually exclusive",
                self.name
            )),
            (None, None) => Err(format!("{}: one of code or fmt is required", self.name)),
        }
    }
}

/// Formats are echoed back as a single token, so anything the read-back
/// grammars treat as a separator can never verify.
fn check_token(field: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    if let Some(c) = value
        .chars()
        .find(|&c| c.is_whitespace() || matches!(c, ':' | '/' | '[' | ']'))
    {
        return Err(format!("{} {:?} contains invalid character {:?}", field, value, c));
    }
    Ok(())
}

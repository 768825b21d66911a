// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Read-back grammars for tool output
//!
//! The two tools report formats differently and each gets its own grammar:
//!
//! - `media-ctl --get-v4l2` embeds `:CODE/WxH` inside a bracketed format
//!   description, e.g. `[fmt:SBGGR10_1X10/1920x1080 field:none]`. The first
//!   such occurrence followed by a closing `]` on the same line wins. `CODE`
//!   has no `:`, `/`, whitespace or brackets. `WxH` stops at whitespace, a
//!   bracket, or the `@` that introduces a frame interval
//!   (`/1920x1080@1/30`).
//! - `yavta -f` prints `Video format: FMT (FOURCC) WxH (stride N) ...`. `FMT`
//!   is the first token after the literal prefix, the second token is
//!   skipped, `WxH` is the third. Tokens are separated by single spaces.
//!
//! Both return the reported values verbatim. Comparison happens elsewhere
//! and is exact.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Format and size as printed by a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedFormat {
    /// Media-bus code or pixel format
    pub format: String,
    /// Size text, normally `WxH`
    pub dims: String,
}

impl fmt::Display for ReportedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.format, self.dims)
    }
}

/// Which grammar a [`ParseFailure`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `:CODE/WxH` from media-ctl
    Subdevice,
    /// `Video format: FMT ... WxH` from yavta
    Video,
}

/// The tool output did not contain a format report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFailure(pub Grammar);

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Grammar::Subdevice => f.write_str("no ':CODE/WxH' format in tool output"),
            Grammar::Video => f.write_str("no 'Video format: FMT ... WxH' line in tool output"),
        }
    }
}

fn subdev_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r":([^:/\s\[\]]+)/([^\s\[\]@]+)(?:@[^\s\[\]]*)?(?:[ \t][^\]\n]*)?\]")
            .expect("subdevice format pattern")
    })
}

fn video_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Video format: (\S+) \S+ (\S+)").expect("video format pattern")
    })
}

fn capture(pattern: &Regex, text: &str, grammar: Grammar) -> Result<ReportedFormat, ParseFailure> {
    let caps = pattern.captures(text).ok_or(ParseFailure(grammar))?;
    Ok(ReportedFormat {
        format: caps[1].to_string(),
        dims: caps[2].to_string(),
    })
}

/// Extract `(CODE, WxH)` from `media-ctl --get-v4l2` output
pub fn parse_subdev_format(text: &str) -> Result<ReportedFormat, ParseFailure> {
    capture(subdev_pattern(), text, Grammar::Subdevice)
}

/// Extract `(FMT, WxH)` from `yavta -f ... -s ...` output
pub fn parse_video_format(text: &str) -> Result<ReportedFormat, ParseFailure> {
    capture(video_pattern(), text, Grammar::Video)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reported(format: &str, dims: &str) -> ReportedFormat {
        ReportedFormat {
            format: format.to_string(),
            dims: dims.to_string(),
        }
    }

    #[test]
    fn test_subdev_legacy_output() {
        assert_eq!(
            parse_subdev_format("\t\t[fmt:UYVY8_2X8/1920x1080]"),
            Ok(reported("UYVY8_2X8", "1920x1080"))
        );
    }

    #[test]
    fn test_subdev_with_attributes() {
        let text = "\t\t[fmt:SBGGR10_1X10/2592x1944 field:none colorspace:raw \
                    crop.bounds:(0,0)/2592x1944 crop:(0,0)/2592x1944]";
        assert_eq!(
            parse_subdev_format(text),
            Ok(reported("SBGGR10_1X10", "2592x1944"))
        );
    }

    #[test]
    fn test_subdev_ignores_entity_header() {
        let text = "- entity 1: ov5640 1-003c (1 pad, 1 link)\n\
                    \tpad0: Source\n\
                    \t\t[fmt:RGB888_1X24/640x480]";
        assert_eq!(parse_subdev_format(text), Ok(reported("RGB888_1X24", "640x480")));
    }

    #[test]
    fn test_subdev_unparsable() {
        assert_eq!(
            parse_subdev_format("Unable to parse pad 'ov5640':9"),
            Err(ParseFailure(Grammar::Subdevice))
        );
        assert_eq!(parse_subdev_format(""), Err(ParseFailure(Grammar::Subdevice)));
    }

    #[test]
    fn test_subdev_requires_closing_bracket() {
        assert_eq!(
            parse_subdev_format("\t\t[fmt:UYVY8_2X8/1920x1080"),
            Err(ParseFailure(Grammar::Subdevice))
        );
        assert_eq!(
            parse_subdev_format("\t\t[fmt:UYVY8_2X8/1920x1080 field:none\n]"),
            Err(ParseFailure(Grammar::Subdevice))
        );
    }

    #[test]
    fn test_subdev_frame_interval() {
        assert_eq!(
            parse_subdev_format("\t\t[fmt:UYVY8_2X8/1920x1080@1/30 field:none colorspace:srgb]"),
            Ok(reported("UYVY8_2X8", "1920x1080"))
        );
    }

    #[test]
    fn test_subdev_dims_verbatim() {
        assert_eq!(
            parse_subdev_format("[fmt:Y8_1X8/1920X1080]"),
            Ok(reported("Y8_1X8", "1920X1080"))
        );
        assert_eq!(
            parse_subdev_format("[fmt:Y8_1X8/1920 x 1080]"),
            Ok(reported("Y8_1X8", "1920"))
        );
    }

    #[test]
    fn test_video_format_line() {
        let text = "Device /dev/video0 opened.\n\
                    Device `mxc-isi-cap' on `platform:32e00000.isi' is a video output (without mplanes) device.\n\
                    Video format set: SBGGR8 (31384142) 640x480 (stride 640) field none buffer size 307200\n\
                    Video format: SBGGR8 (31384142) 640x480 (stride 640) field none buffer size 307200";
        assert_eq!(parse_video_format(text), Ok(reported("SBGGR8", "640x480")));
    }

    #[test]
    fn test_video_unparsable() {
        assert_eq!(
            parse_video_format("Device /dev/video0 opened.\nUnable to set format: Invalid argument (22)."),
            Err(ParseFailure(Grammar::Video))
        );
        assert_eq!(
            parse_video_format("Video format: YUYV"),
            Err(ParseFailure(Grammar::Video))
        );
    }

    #[test]
    fn test_video_spaced_dims() {
        assert_eq!(
            parse_video_format("Video format: YUYV (56595559) 1920 x 1080 (stride 3840)"),
            Ok(reported("YUYV", "1920"))
        );
    }

    #[test]
    fn test_parse_failure_display() {
        assert!(ParseFailure(Grammar::Video).to_string().contains("Video format"));
    }
}

//! Quality tier resolution: output pixel size and encoder settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TimelineError, TimelineResult};
use crate::timeline::AspectRatio;

/// Output quality tier. Parsing is case-sensitive and has no fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Quality {
    Uhd4k,
    Fhd1080p,
    Hd720p,
    Sd480p,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Uhd4k => "4K",
            Quality::Fhd1080p => "1080P",
            Quality::Hd720p => "720P",
            Quality::Sd480p => "480P",
        }
    }

    /// Width of the output frame; the height follows from the aspect ratio.
    pub fn reference_width(&self) -> u32 {
        match self {
            Quality::Uhd4k => 3840,
            Quality::Fhd1080p => 1920,
            Quality::Hd720p => 1280,
            Quality::Sd480p => 854,
        }
    }
}

impl FromStr for Quality {
    type Err = TimelineError;

    fn from_str(s: &str) -> TimelineResult<Self> {
        match s {
            "4K" => Ok(Quality::Uhd4k),
            "1080P" => Ok(Quality::Fhd1080p),
            "720P" => Ok(Quality::Hd720p),
            "480P" => Ok(Quality::Sd480p),
            other => Err(TimelineError::UnknownQuality {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Quality {
    type Error = TimelineError;

    fn try_from(value: String) -> TimelineResult<Self> {
        value.parse()
    }
}

impl From<Quality> for String {
    fn from(quality: Quality) -> String {
        quality.as_str().to_string()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    H265,
}

impl VideoCodec {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::H265 => "h265",
        }
    }

    /// Encoder name handed to the rendering engine.
    pub fn encoder(&self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::H265 => "libx265",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputProfile {
    pub quality: Quality,
    pub width: u32,
    pub height: u32,
    pub video_bitrate: &'static str,
    pub audio_bitrate: &'static str,
    pub video_codec: VideoCodec,
    pub preset: &'static str,
    pub crf: u8,
}

impl OutputProfile {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Pixel size for `quality` at `aspect_ratio`.
pub fn resolve_dimensions(quality: Quality, aspect_ratio: AspectRatio) -> (u32, u32) {
    let width = quality.reference_width();
    let height = (width as f64 / aspect_ratio.ratio()).round() as u32;
    (width, height)
}

pub fn resolve_output_profile(quality: Quality, aspect_ratio: AspectRatio) -> OutputProfile {
    let (width, height) = resolve_dimensions(quality, aspect_ratio);
    let (video_bitrate, audio_bitrate, video_codec, preset, crf) = match quality {
        Quality::Uhd4k => ("15000k", "256k", VideoCodec::H265, "slow", 18),
        Quality::Fhd1080p => ("5000k", "192k", VideoCodec::H264, "medium", 23),
        Quality::Hd720p => ("2500k", "192k", VideoCodec::H264, "medium", 23),
        Quality::Sd480p => ("1000k", "192k", VideoCodec::H264, "medium", 23),
    };

    OutputProfile {
        quality,
        width,
        height,
        video_bitrate,
        audio_bitrate,
        video_codec,
        preset,
        crf,
    }
}

/// String-level entry point: parses both the tier and the aspect ratio.
pub fn resolve(quality: &str, aspect_ratio: &str) -> TimelineResult<OutputProfile> {
    let quality: Quality = quality.parse()?;
    let aspect_ratio: AspectRatio = aspect_ratio.parse()?;
    Ok(resolve_output_profile(quality, aspect_ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_reference_dimensions() {
        assert_eq!(resolve("720P", "16:9").unwrap().dimensions(), (1280, 720));
        assert_eq!(resolve("4K", "9:16").unwrap().dimensions(), (3840, 6827));
        assert_eq!(resolve("1080P", "1:1").unwrap().dimensions(), (1920, 1920));
        assert_eq!(resolve("480P", "16:9").unwrap().dimensions(), (854, 480));
        assert_eq!(resolve("1080P", "4:3").unwrap().dimensions(), (1920, 1440));
    }

    #[test]
    fn encoding_table_by_tier() {
        let uhd = resolve("4K", "16:9").unwrap();
        assert_eq!(uhd.video_bitrate, "15000k");
        assert_eq!(uhd.audio_bitrate, "256k");
        assert_eq!(uhd.video_codec, VideoCodec::H265);
        assert_eq!(uhd.video_codec.encoder(), "libx265");
        assert_eq!(uhd.preset, "slow");
        assert_eq!(uhd.crf, 18);

        let sd = resolve("480P", "16:9").unwrap();
        assert_eq!(sd.video_bitrate, "1000k");
        assert_eq!(sd.audio_bitrate, "192k");
        assert_eq!(sd.video_codec, VideoCodec::H264);
        assert_eq!(sd.preset, "medium");
        assert_eq!(sd.crf, 23);
    }

    #[test]
    fn quality_is_case_sensitive_without_fallback() {
        for bad in ["480p", "4k", "", "1440P", "720"] {
            assert_eq!(
                resolve(bad, "16:9"),
                Err(TimelineError::UnknownQuality {
                    value: bad.to_string()
                })
            );
        }
    }

    #[test]
    fn bad_aspect_ratio_is_rejected() {
        assert!(matches!(
            resolve("720P", "wide"),
            Err(TimelineError::InvalidAspectRatio { .. })
        ));
    }

    #[test]
    fn quality_serializes_as_tier_name() {
        assert_eq!(serde_json::to_string(&Quality::Fhd1080p).unwrap(), "\"1080P\"");
        let parsed: Quality = serde_json::from_str("\"4K\"").unwrap();
        assert_eq!(parsed, Quality::Uhd4k);
    }
}

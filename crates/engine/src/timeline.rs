use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{TimelineError, TimelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Transition into a segment. The serialized names are the rendering
/// engine's transition identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Fade,
    FadeBlack,
    FadeWhite,
    Distance,
    WipeLeft,
    WipeRight,
    WipeUp,
    WipeDown,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    SmoothLeft,
    SmoothRight,
    SmoothUp,
    SmoothDown,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::Fade => "fade",
            TransitionKind::FadeBlack => "fadeblack",
            TransitionKind::FadeWhite => "fadewhite",
            TransitionKind::Distance => "distance",
            TransitionKind::WipeLeft => "wipeleft",
            TransitionKind::WipeRight => "wiperight",
            TransitionKind::WipeUp => "wipeup",
            TransitionKind::WipeDown => "wipedown",
            TransitionKind::SlideLeft => "slideleft",
            TransitionKind::SlideRight => "slideright",
            TransitionKind::SlideUp => "slideup",
            TransitionKind::SlideDown => "slidedown",
            TransitionKind::SmoothLeft => "smoothleft",
            TransitionKind::SmoothRight => "smoothright",
            TransitionKind::SmoothUp => "smoothup",
            TransitionKind::SmoothDown => "smoothdown",
        }
    }
}

impl Default for TransitionKind {
    fn default() -> Self {
        TransitionKind::Fade
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project frame rate. Only the rates the editor offers are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FrameRate {
    Fps24,
    Fps30,
    Fps60,
}

impl FrameRate {
    pub fn as_u32(&self) -> u32 {
        match self {
            FrameRate::Fps24 => 24,
            FrameRate::Fps30 => 30,
            FrameRate::Fps60 => 60,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.as_u32() as f64
    }

    /// Whole number of frames covering `seconds` at this rate.
    pub fn frames_for(&self, seconds: f64) -> u64 {
        (seconds * self.as_f64()).round().max(0.0) as u64
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = TimelineError;

    fn try_from(value: u32) -> TimelineResult<Self> {
        match value {
            24 => Ok(FrameRate::Fps24),
            30 => Ok(FrameRate::Fps30),
            60 => Ok(FrameRate::Fps60),
            other => Err(TimelineError::UnsupportedFrameRate { value: other }),
        }
    }
}

impl From<FrameRate> for u32 {
    fn from(rate: FrameRate) -> u32 {
        rate.as_u32()
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}

/// A `W:H` aspect ratio with positive integer terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> TimelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(TimelineError::InvalidAspectRatio {
                value: format!("{}:{}", width, height),
            });
        }
        Ok(AspectRatio { width, height })
    }

    /// Width divided by height.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl FromStr for AspectRatio {
    type Err = TimelineError;

    fn from_str(s: &str) -> TimelineResult<Self> {
        let invalid = || TimelineError::InvalidAspectRatio {
            value: s.to_string(),
        };

        let (w, h) = s.trim().split_once(':').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(AspectRatio { width, height })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = TimelineError;

    fn try_from(value: String) -> TimelineResult<Self> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> String {
        ratio.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// One media item placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSegment {
    pub id: Uuid,
    pub kind: MediaKind,
    /// Display duration in seconds.
    pub duration: f64,
    #[serde(default)]
    pub transition: TransitionKind,
    /// Opaque locator, resolved outside the engine.
    pub source_ref: String,
    #[serde(default)]
    pub order_index: u32,
}

impl MediaSegment {
    pub fn new(kind: MediaKind, duration: f64, source_ref: impl Into<String>) -> Self {
        MediaSegment {
            id: Uuid::new_v4(),
            kind,
            duration,
            transition: TransitionKind::default(),
            source_ref: source_ref.into(),
            order_index: 0,
        }
    }

    pub fn with_transition(mut self, transition: TransitionKind) -> Self {
        self.transition = transition;
        self
    }

    pub fn is_photo(&self) -> bool {
        self.kind == MediaKind::Photo
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub segment: MediaSegment,
    pub start_offset_secs: f64,
    /// Overlap with the previous entry; zero for the first one.
    pub transition_overlap_secs: f64,
}

impl TimelineEntry {
    pub fn end_secs(&self) -> f64 {
        self.start_offset_secs + self.segment.duration
    }
}

/// Compiled, immutable timeline. Built by [`crate::compile_timeline`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub(crate) entries: Vec<TimelineEntry>,
    pub frame_rate: FrameRate,
    pub aspect_ratio: AspectRatio,
}

impl Timeline {
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.entries.last().map(TimelineEntry::end_secs).unwrap_or(0.0)
    }

    /// Never above `u32::MAX`; longer timelines do not compile.
    pub fn total_frames(&self) -> u64 {
        self.frame_rate.frames_for(self.total_duration_secs())
    }

    pub fn start_offsets(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.start_offset_secs).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aspect_ratio() {
        let ratio: AspectRatio = "16:9".parse().unwrap();
        assert_eq!(ratio, AspectRatio { width: 16, height: 9 });
        assert_eq!(ratio.to_string(), "16:9");
    }

    #[test]
    fn rejects_malformed_aspect_ratios() {
        for bad in ["", "16", "16:", ":9", "0:9", "16:0", "-16:9", "2.35:1", "a:b", "16:9:1"] {
            assert!(
                matches!(
                    bad.parse::<AspectRatio>(),
                    Err(TimelineError::InvalidAspectRatio { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn frame_rate_is_a_closed_set() {
        assert_eq!(FrameRate::try_from(30).unwrap(), FrameRate::Fps30);
        assert_eq!(
            FrameRate::try_from(25),
            Err(TimelineError::UnsupportedFrameRate { value: 25 })
        );
        let parsed: Result<FrameRate, _> = serde_json::from_str("48");
        assert!(parsed.is_err());
    }

    #[test]
    fn transition_wire_names_match_engine_names() {
        let json = serde_json::to_string(&TransitionKind::SmoothDown).unwrap();
        assert_eq!(json, "\"smoothdown\"");
        let kind: TransitionKind = serde_json::from_str("\"fadeblack\"").unwrap();
        assert_eq!(kind, TransitionKind::FadeBlack);
        assert_eq!(kind.as_str(), "fadeblack");
    }

    #[test]
    fn segment_deserializes_from_camel_case() {
        let json = r#"{
            "id": "9b2c7a52-2f1e-4a55-9f8e-6d1f0e3c1a10",
            "kind": "photo",
            "duration": 5,
            "transition": "wipeleft",
            "sourceRef": "cid-1",
            "orderIndex": 2
        }"#;
        let segment: MediaSegment = serde_json::from_str(json).unwrap();
        assert!(segment.is_photo());
        assert_eq!(segment.duration, 5.0);
        assert_eq!(segment.transition, TransitionKind::WipeLeft);
        assert_eq!(segment.order_index, 2);
    }
}

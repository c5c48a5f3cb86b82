//! Player-facing preview timeline.
//!
//! The interactive player never sees the render engine's filter graph; it
//! plays a flat list of segment and transition directives measured in frames.
//! Joins here are a fixed half-second wipe whatever transition the segment
//! declares, which is shorter than the render engine's one-second blend.

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::profile::{resolve_dimensions, Quality};
use crate::timeline::Timeline;

pub const PREVIEW_TRANSITION_SECS: f64 = 0.5;
pub const MIN_FADE_SECS: f64 = 0.5;
pub const MAX_FADE_SECS: f64 = 1.5;

/// Size the player composes at, independent of the export tier.
pub const PREVIEW_QUALITY: Quality = Quality::Hd720p;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewTransitionKind {
    Fade,
    Wipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PreviewDirective {
    Segment {
        #[serde(rename = "mediaRef")]
        media_ref: String,
        #[serde(rename = "durationInFrames")]
        duration_in_frames: u32,
    },
    Transition {
        kind: PreviewTransitionKind,
        #[serde(rename = "durationInFrames")]
        duration_in_frames: u32,
    },
}

impl PreviewDirective {
    pub fn duration_in_frames(&self) -> u32 {
        match self {
            PreviewDirective::Segment {
                duration_in_frames, ..
            }
            | PreviewDirective::Transition {
                duration_in_frames, ..
            } => *duration_in_frames,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewOptions {
    /// Whole-timeline fade in and out.
    pub fade: bool,
    pub fade_in_secs: f64,
    pub fade_out_secs: f64,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        PreviewOptions {
            fade: true,
            fade_in_secs: MAX_FADE_SECS,
            fade_out_secs: MAX_FADE_SECS,
        }
    }
}

impl PreviewOptions {
    pub fn without_fades() -> Self {
        PreviewOptions {
            fade: false,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewTimeline {
    pub directives: Vec<PreviewDirective>,
    /// Authoritative length reported to the player.
    pub duration_in_frames: u32,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
}

/// Clamp a requested fade to the range the player supports.
pub fn clamp_fade(seconds: f64) -> f64 {
    if seconds.is_nan() {
        return MIN_FADE_SECS;
    }
    seconds.clamp(MIN_FADE_SECS, MAX_FADE_SECS)
}

pub fn build_preview(timeline: &Timeline, options: &PreviewOptions) -> TimelineResult<PreviewTimeline> {
    if timeline.is_empty() {
        return Err(TimelineError::EmptyTimeline);
    }

    let fps = timeline.frame_rate;
    let transition_frames = fps.frames_for(PREVIEW_TRANSITION_SECS);
    // Half a join, rounded up to a whole frame.
    let half_transition = (transition_frames + 1) / 2;

    let entries = timeline.entries();
    let mut directives = Vec::with_capacity(entries.len() * 2 + 1);
    let mut total = 0u64;

    if options.fade {
        let frames = fps.frames_for(clamp_fade(options.fade_in_secs));
        directives.push(PreviewDirective::Transition {
            kind: PreviewTransitionKind::Fade,
            duration_in_frames: player_frames(frames, timeline)?,
        });
        total += frames;
    }

    for (idx, entry) in entries.iter().enumerate() {
        let frames = fps.frames_for(entry.segment.duration) + half_transition;
        directives.push(PreviewDirective::Segment {
            media_ref: entry.segment.source_ref.clone(),
            duration_in_frames: player_frames(frames, timeline)?,
        });
        total += frames;

        if idx + 1 < entries.len() {
            directives.push(PreviewDirective::Transition {
                kind: PreviewTransitionKind::Wipe,
                duration_in_frames: player_frames(transition_frames, timeline)?,
            });
        }
    }

    if options.fade {
        let frames = fps.frames_for(clamp_fade(options.fade_out_secs));
        directives.push(PreviewDirective::Transition {
            kind: PreviewTransitionKind::Fade,
            duration_in_frames: player_frames(frames, timeline)?,
        });
        total += frames;
    }
    let total = player_frames(total, timeline)?;

    let (width, height) = resolve_dimensions(PREVIEW_QUALITY, timeline.aspect_ratio);

    Ok(PreviewTimeline {
        directives,
        duration_in_frames: total,
        fps: fps.as_u32(),
        width,
        height,
    })
}

/// The player counts frames in `u32`.
fn player_frames(frames: u64, timeline: &Timeline) -> TimelineResult<u32> {
    u32::try_from(frames).map_err(|_| TimelineError::TimelineTooLong {
        duration_secs: timeline.total_duration_secs(),
        max_frames: u32::MAX,
    })
}

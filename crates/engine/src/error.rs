//! Validation errors raised while compiling a timeline or building its outputs.

use uuid::Uuid;

/// Errors produced by the engine. All of them are local validation failures
/// and are raised before anything is handed to a rendering engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("Invalid aspect ratio: {value:?} (expected two positive integers, e.g. \"16:9\")")]
    InvalidAspectRatio { value: String },

    #[error("Unknown quality tier: {value:?}")]
    UnknownQuality { value: String },

    #[error("Unsupported frame rate: {value} (expected 24, 30 or 60)")]
    UnsupportedFrameRate { value: u32 },

    #[error("Segment {segment_id} is too short ({duration_secs}s) to survive a {overlap_secs}s transition")]
    DegenerateSegment {
        segment_id: Uuid,
        duration_secs: f64,
        overlap_secs: f64,
    },

    #[error("Segment {segment_id} appears more than once")]
    DuplicateSegment { segment_id: Uuid },

    #[error("Timeline runs {duration_secs}s, more than {max_frames} frames")]
    TimelineTooLong { duration_secs: f64, max_frames: u32 },

    #[error("Timeline has no segments")]
    EmptyTimeline,

    #[error("No narration/audio input supplied")]
    MissingAudioInput,

    #[error("No resolved locator for segment {segment_id}")]
    UnresolvedSource { segment_id: Uuid },

    #[error("Segment not found: {segment_id}")]
    SegmentNotFound { segment_id: Uuid },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },
}

/// Result type alias using TimelineError.
pub type TimelineResult<T> = Result<T, TimelineError>;

impl TimelineError {
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: msg.into(),
        }
    }
}

use std::collections::HashSet;

use crate::error::{TimelineError, TimelineResult};
use crate::timeline::*;

/// Seconds two adjacent segments overlap while the rendering engine blends
/// them. An engine constant: the declared transition kind does not change it.
pub const TRANSITION_OVERLAP_SECS: f64 = 1.0;

/// Compile an ordered segment list into a [`Timeline`].
///
/// Input order is authoritative. The first segment starts at 0 with no
/// overlap; every following segment starts one overlap before the previous
/// one ends.
pub fn compile_timeline(
    segments: &[MediaSegment],
    frame_rate: FrameRate,
    aspect_ratio: AspectRatio,
) -> TimelineResult<Timeline> {
    if segments.is_empty() {
        return Err(TimelineError::EmptyTimeline);
    }

    let mut entries: Vec<TimelineEntry> = Vec::with_capacity(segments.len());
    let mut seen = HashSet::with_capacity(segments.len());

    for (index, segment) in segments.iter().enumerate() {
        if !seen.insert(segment.id) {
            return Err(TimelineError::DuplicateSegment {
                segment_id: segment.id,
            });
        }
        validate_duration(segment, index, segments.len())?;

        let entry = match entries.last() {
            None => TimelineEntry {
                segment: segment.clone(),
                start_offset_secs: 0.0,
                transition_overlap_secs: 0.0,
            },
            Some(previous) => TimelineEntry {
                segment: segment.clone(),
                start_offset_secs: previous.end_secs() - TRANSITION_OVERLAP_SECS,
                transition_overlap_secs: TRANSITION_OVERLAP_SECS,
            },
        };
        entries.push(entry);
    }

    let timeline = Timeline {
        entries,
        frame_rate,
        aspect_ratio,
    };
    if timeline.total_frames() > u64::from(u32::MAX) {
        return Err(TimelineError::TimelineTooLong {
            duration_secs: timeline.total_duration_secs(),
            max_frames: u32::MAX,
        });
    }
    Ok(timeline)
}

fn validate_duration(segment: &MediaSegment, index: usize, count: usize) -> TimelineResult<()> {
    let duration = segment.duration;
    let degenerate = if !duration.is_finite() || duration <= 0.0 {
        true
    } else if index > 0 {
        // Entirely swallowed by the incoming transition.
        duration <= TRANSITION_OVERLAP_SECS
    } else {
        // A short opener would push the second segment before zero.
        count > 1 && duration < TRANSITION_OVERLAP_SECS
    };

    if degenerate {
        return Err(TimelineError::DegenerateSegment {
            segment_id: segment.id,
            duration_secs: duration,
            overlap_secs: TRANSITION_OVERLAP_SECS,
        });
    }
    Ok(())
}

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{TimelineError, TimelineResult};
use crate::timeline::*;

/// Edits to the ordered segment list. Every edit produces a new list; the
/// segments passed in are never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum SegmentOperation {
    /// Put segments in the given id order. Ids missing from `order` drop out;
    /// unknown ids and repeats of an id are ignored.
    Reorder { order: Vec<Uuid> },
    MoveSegment { segment_id: Uuid, to_index: usize },
    InsertSegment { segment: MediaSegment, index: usize },
    RemoveSegment { segment_id: Uuid },
    SetDuration { segment_id: Uuid, duration: f64 },
    SetTransition {
        segment_id: Uuid,
        transition: TransitionKind,
    },
}

pub fn apply_operation(segments: &[MediaSegment], op: SegmentOperation) -> TimelineResult<Vec<MediaSegment>> {
    let mut next: Vec<MediaSegment> = segments.to_vec();

    match op {
        SegmentOperation::Reorder { order } => {
            next = reorder_by_ids(segments, &order);
        }
        SegmentOperation::MoveSegment {
            segment_id,
            to_index,
        } => {
            let from = position_of(&next, segment_id)?;
            if to_index >= next.len() {
                return Err(TimelineError::invalid_operation(format!(
                    "move target {} is out of range for {} segments",
                    to_index,
                    next.len()
                )));
            }
            let segment = next.remove(from);
            next.insert(to_index, segment);
        }
        SegmentOperation::InsertSegment { segment, index } => {
            if index > next.len() {
                return Err(TimelineError::invalid_operation(format!(
                    "insert index {} is out of range for {} segments",
                    index,
                    next.len()
                )));
            }
            if next.iter().any(|s| s.id == segment.id) {
                return Err(TimelineError::invalid_operation(format!(
                    "segment {} is already on the timeline",
                    segment.id
                )));
            }
            check_duration(segment.duration)?;
            next.insert(index, segment);
        }
        SegmentOperation::RemoveSegment { segment_id } => {
            let idx = position_of(&next, segment_id)?;
            next.remove(idx);
        }
        SegmentOperation::SetDuration {
            segment_id,
            duration,
        } => {
            check_duration(duration)?;
            let idx = position_of(&next, segment_id)?;
            next[idx].duration = duration;
        }
        SegmentOperation::SetTransition {
            segment_id,
            transition,
        } => {
            let idx = position_of(&next, segment_id)?;
            next[idx].transition = transition;
        }
    }

    Ok(renumber(next))
}

/// Apply a batch in order, stopping at the first failing edit.
pub fn apply_operations(
    segments: &[MediaSegment],
    ops: impl IntoIterator<Item = SegmentOperation>,
) -> TimelineResult<Vec<MediaSegment>> {
    let mut current = segments.to_vec();
    for op in ops {
        current = apply_operation(&current, op)?;
    }
    Ok(current)
}

/// Order `segments` by the id list the project stores. The first occurrence
/// of a repeated id wins.
pub fn reorder_by_ids(segments: &[MediaSegment], order: &[Uuid]) -> Vec<MediaSegment> {
    let by_id: HashMap<Uuid, &MediaSegment> = segments.iter().map(|s| (s.id, s)).collect();
    let mut seen = HashSet::with_capacity(order.len());
    let reordered = order
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| by_id.get(id).map(|s| (*s).clone()))
        .collect();
    renumber(reordered)
}

fn renumber(mut segments: Vec<MediaSegment>) -> Vec<MediaSegment> {
    for (idx, segment) in segments.iter_mut().enumerate() {
        segment.order_index = idx as u32;
    }
    segments
}

fn position_of(segments: &[MediaSegment], segment_id: Uuid) -> TimelineResult<usize> {
    segments
        .iter()
        .position(|s| s.id == segment_id)
        .ok_or(TimelineError::SegmentNotFound { segment_id })
}

fn check_duration(duration: f64) -> TimelineResult<()> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(TimelineError::invalid_operation(format!(
            "duration must be a positive number of seconds, got {}",
            duration
        )));
    }
    Ok(())
}

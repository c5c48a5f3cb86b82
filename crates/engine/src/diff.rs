use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::timeline::MediaSegment;

/// What changed between two versions of a project's segment list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentDiff {
    pub count_changed: bool,
    pub order_changed: bool,
    pub added: Vec<Uuid>,
    pub removed: Vec<Uuid>,
    pub durations_changed: Vec<Uuid>,
    pub transitions_changed: Vec<Uuid>,
}

impl SegmentDiff {
    /// Whether the compiled timeline (and so the preview) is stale.
    pub fn requires_recompile(&self) -> bool {
        self.count_changed
            || self.order_changed
            || !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.durations_changed.is_empty()
            || !self.transitions_changed.is_empty()
    }
}

pub fn diff_segments(from: &[MediaSegment], to: &[MediaSegment]) -> SegmentDiff {
    let before: HashMap<Uuid, &MediaSegment> = from.iter().map(|s| (s.id, s)).collect();
    let after: HashMap<Uuid, &MediaSegment> = to.iter().map(|s| (s.id, s)).collect();

    let mut diff = SegmentDiff {
        count_changed: from.len() != to.len(),
        ..Default::default()
    };

    for segment in to {
        match before.get(&segment.id) {
            None => diff.added.push(segment.id),
            Some(old) => {
                if old.duration != segment.duration {
                    diff.durations_changed.push(segment.id);
                }
                if old.transition != segment.transition {
                    diff.transitions_changed.push(segment.id);
                }
            }
        }
    }
    diff.removed = from
        .iter()
        .filter(|s| !after.contains_key(&s.id))
        .map(|s| s.id)
        .collect();

    // Relative order of the segments present in both lists.
    let kept_before = from.iter().map(|s| s.id).filter(|id| after.contains_key(id));
    let kept_after = to.iter().map(|s| s.id).filter(|id| before.contains_key(id));
    diff.order_changed = !kept_before.eq(kept_after);

    diff
}

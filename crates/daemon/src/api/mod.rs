use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use slideshow_engine::ops::reorder_by_ids;
use slideshow_engine::{compile_timeline, AspectRatio, FrameRate, MediaSegment, Timeline, TimelineResult};

use crate::state::AppState;

pub mod jobs;
pub mod preview;
pub mod render;
pub mod timeline;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/timeline", timeline::router())
        .nest("/projects", Router::new().merge(preview::router()).merge(render::router()))
        .nest("/jobs", jobs::router())
        .with_state(state)
}

/// A project as clients send it: segments plus the settings they compile under.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub segments: Vec<MediaSegment>,
    pub frame_rate: u32,
    pub aspect_ratio: String,
    #[serde(default)]
    pub narration_ref: Option<String>,
    /// Stored id order. When present it overrides the order of `segments`.
    #[serde(default)]
    pub media_order: Option<Vec<Uuid>>,
}

impl ProjectPayload {
    pub fn ordered_segments(&self) -> Vec<MediaSegment> {
        match &self.media_order {
            Some(order) => reorder_by_ids(&self.segments, order),
            None => self.segments.clone(),
        }
    }

    pub fn compile(&self) -> TimelineResult<Timeline> {
        let frame_rate = FrameRate::try_from(self.frame_rate)?;
        let aspect_ratio: AspectRatio = self.aspect_ratio.parse()?;
        compile_timeline(&self.ordered_segments(), frame_rate, aspect_ratio)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use slideshow_engine::{MediaKind, TimelineError};

    fn payload(segments: Vec<MediaSegment>) -> ProjectPayload {
        ProjectPayload {
            segments,
            frame_rate: 30,
            aspect_ratio: "16:9".to_string(),
            narration_ref: None,
            media_order: None,
        }
    }

    #[test]
    fn media_order_overrides_segment_order() {
        let a = MediaSegment::new(MediaKind::Photo, 3.0, "a");
        let b = MediaSegment::new(MediaKind::Photo, 4.0, "b");
        let mut project = payload(vec![a.clone(), b.clone()]);
        project.media_order = Some(vec![b.id, a.id]);

        let timeline = project.compile().unwrap();
        assert_eq!(timeline.entries()[0].segment.id, b.id);
        assert_eq!(timeline.start_offsets(), vec![0.0, 3.0]);
    }

    #[test]
    fn repeated_ids_in_media_order_compile_once() {
        let a = MediaSegment::new(MediaKind::Photo, 3.0, "a");
        let b = MediaSegment::new(MediaKind::Photo, 4.0, "b");
        let mut project = payload(vec![a.clone(), b.clone()]);
        project.media_order = Some(vec![b.id, a.id, b.id]);

        let timeline = project.compile().unwrap();
        assert_eq!(timeline.entries().len(), 2);
        assert_eq!(timeline.total_duration_secs(), 6.0);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut project = payload(vec![MediaSegment::new(MediaKind::Photo, 3.0, "a")]);
        project.frame_rate = 25;
        assert_eq!(project.compile(), Err(TimelineError::UnsupportedFrameRate { value: 25 }));

        project.frame_rate = 24;
        project.aspect_ratio = "2.35:1".to_string();
        assert!(matches!(project.compile(), Err(TimelineError::InvalidAspectRatio { .. })));
    }
}

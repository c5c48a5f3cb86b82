use axum::{
    extract::Path,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::debug;

use slideshow_engine::preview::{build_preview, PreviewOptions, PreviewTimeline};

use super::ProjectPayload;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PreviewRequest {
    #[serde(flatten)]
    project: ProjectPayload,
    #[serde(default)]
    preview: PreviewOptions,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/:id/preview", post(preview))
}

async fn preview(
    Path(project_id): Path<String>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<Json<PreviewTimeline>> {
    let timeline = req.project.compile()?;
    let preview = build_preview(&timeline, &req.preview)?;
    debug!(
        "Preview for project {}: {} directives, {} frames",
        project_id,
        preview.directives.len(),
        preview.duration_in_frames
    );
    Ok(Json(preview))
}

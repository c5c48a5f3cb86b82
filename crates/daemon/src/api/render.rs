use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use slideshow_engine::profile::{resolve_output_profile, Quality};
use slideshow_engine::render::{build_render_job, RenderJobSpec};
use slideshow_engine::{MediaSegment, TimelineError};

use super::ProjectPayload;
use crate::error::{ApiError, ApiResult};
use crate::services::sources::resolve_sources;
use crate::state::AppState;

const CALLER_HEADER: &str = "x-caller-id";
const ANONYMOUS_CALLER: &str = "anonymous";
const DEFAULT_QUALITY: &str = "720P";

#[derive(Deserialize)]
pub struct RenderQuery {
    quality: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderAccepted {
    job_id: i64,
    quality: Quality,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/render", post(render))
        .route("/:id/render/spec", post(render_spec))
}

/// Build the job without submitting it.
async fn render_spec(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
    Json(project): Json<ProjectPayload>,
) -> ApiResult<Json<RenderJobSpec>> {
    let quality = parse_quality(query.quality.as_deref())?;
    let spec = prepare_job(&state, &project, quality).await?;
    Ok(Json(spec))
}

async fn render(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<RenderQuery>,
    headers: HeaderMap,
    Json(project): Json<ProjectPayload>,
) -> ApiResult<(StatusCode, Json<RenderAccepted>)> {
    let caller = caller_id(&headers);
    if !state.limiter.check(&caller) {
        warn!("Render rate limit hit for caller {}", caller);
        return Err(ApiError::RateLimited);
    }

    let quality = parse_quality(query.quality.as_deref())?;
    let spec = prepare_job(&state, &project, quality).await?;

    let job_id = state.jobs.create_job(&project_id, quality.as_str(), &spec)?;
    info!(
        "Queued render job {} for project {} at {}",
        job_id,
        project_id,
        quality.as_str()
    );
    state.processor.clone().spawn(job_id, spec);

    Ok((StatusCode::ACCEPTED, Json(RenderAccepted { job_id, quality })))
}

fn caller_id(headers: &HeaderMap) -> String {
    headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(ANONYMOUS_CALLER)
        .to_string()
}

fn parse_quality(raw: Option<&str>) -> Result<Quality, TimelineError> {
    raw.unwrap_or(DEFAULT_QUALITY).parse()
}

/// Validate, compile and resolve a project into a submittable job.
/// Every validation failure surfaces here, before any engine call.
async fn prepare_job(state: &AppState, project: &ProjectPayload, quality: Quality) -> ApiResult<RenderJobSpec> {
    let timeline = project.compile()?;
    let profile = resolve_output_profile(quality, timeline.aspect_ratio);

    let narration = project
        .narration_ref
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .ok_or(TimelineError::MissingAudioInput)?;

    let segments: Vec<MediaSegment> = timeline.entries().iter().map(|e| e.segment.clone()).collect();
    let sources = resolve_sources(state.resolver.as_ref(), &segments, narration)
        .await
        .map_err(|e| ApiError::upstream(format!("{:#}", e)))?;

    let spec = build_render_job(&timeline, &profile, &sources, &state.config.render.artifact_name)?;
    Ok(spec)
}

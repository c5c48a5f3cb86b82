use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::error::{ApiError, ApiResult};
use crate::jobs::RenderJob;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:id", get(get_job))
}

async fn get_job(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<RenderJob>> {
    let job = state
        .jobs
        .get_job(id)?
        .ok_or_else(|| ApiError::not_found(format!("render job {}", id)))?;
    Ok(Json(job))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{send, state};
    use crate::render_engine::test_support::sample_spec;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn returns_job_record() {
        let state = state();
        let id = state.jobs.create_job("p9", "480P", &sample_spec()).unwrap();
        state.jobs.mark_failed(id, "engine unreachable", None).unwrap();

        let (status, body) = send(&state, get(&format!("/jobs/{}", id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(id));
        assert_eq!(body["projectId"], "p9");
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"], "engine unreachable");
        assert_eq!(body["artifactLocator"], json!(null));
        assert_eq!(body["spec"]["inputs"].as_array().unwrap().len(), 3);
        assert_eq!(body["spec"]["output"]["artifactName"], "generated.mp4");
    }

    #[tokio::test]
    async fn unknown_job_is_404() {
        let (status, body) = send(&state(), get("/jobs/404")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }
}

use axum::{response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};

use slideshow_engine::diff::{diff_segments, SegmentDiff};
use slideshow_engine::ops::{apply_operations, SegmentOperation};
use slideshow_engine::{MediaSegment, Timeline};

use super::ProjectPayload;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    timeline: Timeline,
    total_duration_secs: f64,
    total_frames: u64,
}

#[derive(Deserialize)]
pub struct ApplyOperationsRequest {
    segments: Vec<MediaSegment>,
    operations: Vec<SegmentOperation>,
}

#[derive(Serialize)]
pub struct ApplyOperationsResponse {
    segments: Vec<MediaSegment>,
    diff: SegmentDiff,
}

#[derive(Deserialize)]
pub struct DiffRequest {
    from: Vec<MediaSegment>,
    to: Vec<MediaSegment>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compile", post(compile))
        .route("/apply", post(apply_operations_handler))
        .route("/diff", post(diff))
}

async fn compile(Json(project): Json<ProjectPayload>) -> ApiResult<Json<CompileResponse>> {
    let timeline = project.compile()?;
    Ok(Json(CompileResponse {
        total_duration_secs: timeline.total_duration_secs(),
        total_frames: timeline.total_frames(),
        timeline,
    }))
}

async fn apply_operations_handler(
    Json(req): Json<ApplyOperationsRequest>,
) -> ApiResult<Json<ApplyOperationsResponse>> {
    let segments = apply_operations(&req.segments, req.operations)?;
    let diff = diff_segments(&req.segments, &segments);
    Ok(Json(ApplyOperationsResponse { segments, diff }))
}

async fn diff(Json(req): Json<DiffRequest>) -> Json<SegmentDiff> {
    Json(diff_segments(&req.from, &req.to))
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{post_json, sample_project, send, state};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn compiles_sample_project() {
        let (status, body) = send(&state(), post_json("/timeline/compile", &sample_project())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalDurationSecs"], json!(13.0));
        assert_eq!(body["totalFrames"], json!(390));

        let offsets: Vec<f64> = body["timeline"]["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["startOffsetSecs"].as_f64().unwrap())
            .collect();
        assert_eq!(offsets, vec![0.0, 4.0, 7.0]);
    }

    #[tokio::test]
    async fn degenerate_segment_is_rejected() {
        let mut project = sample_project();
        project["segments"][1]["duration"] = json!(1.0);
        let (status, body) = send(&state(), post_json("/timeline/compile", &project)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "degenerate_segment");
    }

    #[tokio::test]
    async fn repeated_segment_is_rejected() {
        let mut project = sample_project();
        project["segments"][2]["id"] = project["segments"][0]["id"].clone();
        let (status, body) = send(&state(), post_json("/timeline/compile", &project)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "duplicate_segment");
    }

    #[tokio::test]
    async fn empty_project_is_rejected() {
        let mut project = sample_project();
        project["segments"] = json!([]);
        let (status, body) = send(&state(), post_json("/timeline/compile", &project)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "empty_timeline");
    }

    #[tokio::test]
    async fn applies_operations_and_reports_diff() {
        let project = sample_project();
        let request = json!({
            "segments": project["segments"],
            "operations": [
                {"type": "RemoveSegment", "segmentId": "00000000-0000-0000-0000-000000000002"},
                {"type": "SetDuration", "segmentId": "00000000-0000-0000-0000-000000000003", "duration": 3.5}
            ]
        });
        let (status, body) = send(&state(), post_json("/timeline/apply", &request)).await;
        assert_eq!(status, StatusCode::OK);

        let segments = body["segments"].as_array().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1]["duration"], json!(3.5));
        assert_eq!(segments[1]["orderIndex"], json!(1));
        assert_eq!(body["diff"]["removed"], json!(["00000000-0000-0000-0000-000000000002"]));
        assert_eq!(body["diff"]["countChanged"], json!(true));
    }

    #[tokio::test]
    async fn unknown_segment_in_operation_is_rejected() {
        let request = json!({
            "segments": sample_project()["segments"],
            "operations": [{"type": "RemoveSegment", "segmentId": "00000000-0000-0000-0000-0000000000ff"}]
        });
        let (status, body) = send(&state(), post_json("/timeline/apply", &request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "segment_not_found");
    }

    #[tokio::test]
    async fn diffs_two_versions() {
        let from = sample_project()["segments"].clone();
        let mut to = from.clone();
        to[2]["transition"] = json!("slideup");
        let (status, body) = send(&state(), post_json("/timeline/diff", &json!({"from": from, "to": to}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transitionsChanged"], json!(["00000000-0000-0000-0000-000000000003"]));
        assert_eq!(body["orderChanged"], json!(false));
    }
}

//! HTTP-facing error type.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use slideshow_engine::TimelineError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeline(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::RateLimited => "rate_limited",
            ApiError::Upstream(_) => "upstream",
            ApiError::Internal(_) => "internal",
            ApiError::Timeline(e) => match e {
                TimelineError::InvalidAspectRatio { .. } => "invalid_aspect_ratio",
                TimelineError::UnknownQuality { .. } => "unknown_quality",
                TimelineError::UnsupportedFrameRate { .. } => "unsupported_frame_rate",
                TimelineError::DegenerateSegment { .. } => "degenerate_segment",
                TimelineError::DuplicateSegment { .. } => "duplicate_segment",
                TimelineError::TimelineTooLong { .. } => "timeline_too_long",
                TimelineError::EmptyTimeline => "empty_timeline",
                TimelineError::MissingAudioInput => "missing_audio_input",
                TimelineError::UnresolvedSource { .. } => "unresolved_source",
                TimelineError::SegmentNotFound { .. } => "segment_not_found",
                TimelineError::InvalidOperation { .. } => "invalid_operation",
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{:#}", e))
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

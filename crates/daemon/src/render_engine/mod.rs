//! Capability interface to the external rendering engine.

use serde_json::Value;
use std::time::Duration;

use slideshow_engine::render::{RenderJobSpec, RenderOutcome};

#[cfg(test)]
pub mod fake;
pub mod http;

#[derive(Debug, thiserror::Error)]
pub enum RenderEngineError {
    /// The job never reached the engine, or its reply was unreadable.
    #[error("Render engine submission failed: {message}")]
    Submission { message: String },

    /// The engine ran the job but did not produce the expected artifact.
    #[error("Render engine produced no {artifact:?} artifact")]
    JobFailed { artifact: String, logs: Value },

    #[error("Render did not finish within {}s", .budget.as_secs())]
    Timeout { budget: Duration },
}

impl RenderEngineError {
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission {
            message: msg.into(),
        }
    }

    /// Engine diagnostics, when the engine got far enough to report any.
    pub fn logs(&self) -> Option<&Value> {
        match self {
            RenderEngineError::JobFailed { logs, .. } => Some(logs),
            _ => None,
        }
    }
}

/// Anything that can execute a [`RenderJobSpec`].
#[async_trait::async_trait]
pub trait RenderEngine: Send + Sync {
    async fn submit(&self, spec: &RenderJobSpec) -> Result<RenderOutcome, RenderEngineError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRender {
    pub artifact_locator: String,
    pub logs: Value,
}

/// Submit `spec` and wait at most `budget` for the engine to answer.
///
/// Dropping out on timeout does not stop the engine; the job is simply
/// treated as failed. Nothing here retries.
pub async fn render_and_wait(
    engine: &dyn RenderEngine,
    spec: &RenderJobSpec,
    budget: Duration,
) -> Result<CompletedRender, RenderEngineError> {
    let outcome = tokio::time::timeout(budget, engine.submit(spec))
        .await
        .map_err(|_| RenderEngineError::Timeout { budget })??;

    let artifact = &spec.output.artifact_name;
    match outcome.artifact(artifact) {
        Some(locator) => Ok(CompletedRender {
            artifact_locator: locator.to_string(),
            logs: outcome.logs,
        }),
        None => Err(RenderEngineError::JobFailed {
            artifact: artifact.clone(),
            logs: outcome.logs,
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeRenderEngine;
    use super::test_support::sample_spec;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn returns_the_expected_artifact() {
        let engine = FakeRenderEngine::succeeding("generated.mp4", "https://cdn.test/generated.mp4");
        let spec = sample_spec();

        let done = render_and_wait(&engine, &spec, Duration::from_secs(5)).await.unwrap();
        assert_eq!(done.artifact_locator, "https://cdn.test/generated.mp4");
        assert_eq!(engine.submissions(), vec![spec]);
    }

    #[tokio::test]
    async fn missing_artifact_is_a_job_failure_with_logs() {
        let engine = FakeRenderEngine::without_artifact(json!({"stderr": "Invalid filter"}));
        let err = render_and_wait(&engine, &sample_spec(), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(matches!(err, RenderEngineError::JobFailed { ref artifact, .. } if artifact == "generated.mp4"));
        assert_eq!(err.logs(), Some(&json!({"stderr": "Invalid filter"})));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let engine = FakeRenderEngine::unreachable("connection refused");
        let err = render_and_wait(&engine, &sample_spec(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderEngineError::Submission { .. }));
        assert!(err.logs().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_engine_times_out() {
        let engine = FakeRenderEngine::succeeding("generated.mp4", "late.mp4").with_delay(Duration::from_secs(120));
        let err = render_and_wait(&engine, &sample_spec(), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderEngineError::Timeout { budget } if budget == Duration::from_secs(60)));
    }
}

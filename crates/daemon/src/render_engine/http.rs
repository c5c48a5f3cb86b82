use slideshow_engine::render::{RenderJobSpec, RenderOutcome};

use super::{RenderEngine, RenderEngineError};

/// Rendering engine reached over HTTP: `POST {base}/jobs` with the job spec,
/// answered with `{artifacts, logs}` once the job has run.
pub struct HttpRenderEngine {
    client: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl HttpRenderEngine {
    pub fn new(base_url: Option<String>, api_key: Option<String>) -> Self {
        HttpRenderEngine {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn jobs_url(&self) -> Result<String, RenderEngineError> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}/jobs", base))
            .ok_or_else(|| RenderEngineError::submission("RENDER_ENGINE_URL is not configured"))
    }
}

#[async_trait::async_trait]
impl RenderEngine for HttpRenderEngine {
    async fn submit(&self, spec: &RenderJobSpec) -> Result<RenderOutcome, RenderEngineError> {
        let url = self.jobs_url()?;

        let mut request = self.client.post(&url).json(spec);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RenderEngineError::submission(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RenderEngineError::submission(format!(
                "engine returned {} - {}",
                status, error_text
            )));
        }

        response
            .json::<RenderOutcome>()
            .await
            .map_err(|e| RenderEngineError::submission(format!("unreadable engine response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_engine::test_support::sample_spec;

    #[tokio::test]
    async fn unconfigured_engine_fails_at_submission() {
        let engine = HttpRenderEngine::new(None, None);
        let err = engine.submit(&sample_spec()).await.unwrap_err();
        assert!(matches!(err, RenderEngineError::Submission { ref message } if message.contains("RENDER_ENGINE_URL")));
    }

    #[test]
    fn builds_jobs_endpoint() {
        let engine = HttpRenderEngine::new(Some("https://render.test/v1".to_string()), None);
        assert_eq!(engine.jobs_url().unwrap(), "https://render.test/v1/jobs");
    }
}

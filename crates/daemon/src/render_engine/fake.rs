use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use slideshow_engine::render::{RenderJobSpec, RenderOutcome};

use super::{RenderEngine, RenderEngineError};

/// In-process engine with a scripted reply. Records every submitted job.
pub struct FakeRenderEngine {
    reply: Result<RenderOutcome, String>,
    delay: Option<Duration>,
    submissions: Mutex<Vec<RenderJobSpec>>,
}

impl FakeRenderEngine {
    pub fn succeeding(artifact_name: &str, locator: &str) -> Self {
        let mut artifacts = BTreeMap::new();
        artifacts.insert(artifact_name.to_string(), locator.to_string());
        Self::replying(Ok(RenderOutcome {
            artifacts,
            logs: Value::Null,
        }))
    }

    pub fn without_artifact(logs: Value) -> Self {
        Self::replying(Ok(RenderOutcome {
            artifacts: BTreeMap::new(),
            logs,
        }))
    }

    pub fn unreachable(message: &str) -> Self {
        Self::replying(Err(message.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn submissions(&self) -> Vec<RenderJobSpec> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn replying(reply: Result<RenderOutcome, String>) -> Self {
        FakeRenderEngine {
            reply,
            delay: None,
            submissions: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl RenderEngine for FakeRenderEngine {
    async fn submit(&self, spec: &RenderJobSpec) -> Result<RenderOutcome, RenderEngineError> {
        self.submissions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(spec.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(RenderEngineError::submission)
    }
}

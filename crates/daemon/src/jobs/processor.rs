use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use slideshow_engine::render::RenderJobSpec;

use crate::jobs::JobManager;
use crate::render_engine::{render_and_wait, RenderEngine};

/// Drives one render job from pending to a terminal status.
pub struct RenderProcessor {
    job_manager: Arc<JobManager>,
    engine: Arc<dyn RenderEngine>,
    budget: Duration,
}

impl RenderProcessor {
    pub fn new(job_manager: Arc<JobManager>, engine: Arc<dyn RenderEngine>, budget: Duration) -> Self {
        RenderProcessor {
            job_manager,
            engine,
            budget,
        }
    }

    /// Run the job in the background; the handle is only awaited by tests.
    pub fn spawn(self: Arc<Self>, job_id: i64, spec: RenderJobSpec) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.run(job_id, &spec).await {
                error!("Failed to record outcome of render job {}: {:?}", job_id, e);
            }
        })
    }

    pub async fn run(&self, job_id: i64, spec: &RenderJobSpec) -> Result<()> {
        if let Err(e) = self.job_manager.mark_running(job_id) {
            warn!("Render job {} could not start: {:#}", job_id, e);
            self.job_manager
                .mark_failed(job_id, &format!("could not start render: {:#}", e), None)?;
            return Err(e);
        }
        info!(
            "Render job {} submitted ({} inputs, {} filters)",
            job_id,
            spec.inputs.len(),
            spec.filter_chain.len()
        );

        match render_and_wait(self.engine.as_ref(), spec, self.budget).await {
            Ok(done) => {
                info!("Render job {} completed: {}", job_id, done.artifact_locator);
                self.job_manager
                    .mark_completed(job_id, &done.artifact_locator, &done.logs)
            }
            Err(e) => {
                warn!("Render job {} failed: {}", job_id, e);
                self.job_manager.mark_failed(job_id, &e.to_string(), e.logs())
            }
        }
    }
}

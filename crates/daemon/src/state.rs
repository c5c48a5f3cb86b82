use std::sync::Arc;

use crate::config::DaemonConfig;
use crate::jobs::processor::RenderProcessor;
use crate::jobs::JobManager;
use crate::services::rate_limit::SlidingWindowLimiter;
use crate::services::sources::SourceResolver;

/// Shared handles every route gets.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DaemonConfig>,
    pub jobs: Arc<JobManager>,
    pub processor: Arc<RenderProcessor>,
    pub resolver: Arc<dyn SourceResolver>,
    pub limiter: Arc<SlidingWindowLimiter>,
}

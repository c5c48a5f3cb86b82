use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

mod api;
mod config;
mod db;
mod error;
mod jobs;
mod render_engine;
mod services;
mod state;

use config::{DaemonConfig, LoggingConfig, SourceConfig};
use services::sources::{CachedResolver, GatewayResolver, PassthroughResolver, SourceResolver};

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

fn build_resolver(config: &SourceConfig) -> Arc<dyn SourceResolver> {
    match &config.gateway_url {
        Some(url) => {
            info!("Resolving media through source gateway at {}", url);
            let gateway = GatewayResolver::new(url.clone(), config.gateway_key.clone(), config.url_expires);
            Arc::new(CachedResolver::new(gateway, config.cache_max_entries, config.cache_ttl))
        }
        None => {
            info!("SOURCE_GATEWAY_URL not set; media refs are passed to the engine as-is");
            Arc::new(PassthroughResolver)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = DaemonConfig::from_env()?;
    init_logging(&config.logging);

    let db = Arc::new(db::Database::new(&config.db_path)?);
    info!("Database initialized at {:?}", config.db_path);

    let job_manager = Arc::new(jobs::JobManager::new(db));

    if config.render.engine_url.is_none() {
        warn!("RENDER_ENGINE_URL not set; render jobs will fail at submission");
    }
    let engine = Arc::new(render_engine::http::HttpRenderEngine::new(
        config.render.engine_url.clone(),
        config.render.api_key.clone(),
    ));
    let processor = Arc::new(jobs::processor::RenderProcessor::new(
        job_manager.clone(),
        engine,
        config.render.timeout,
    ));

    let addr = config.bind_addr;
    let state = state::AppState {
        resolver: build_resolver(&config.sources),
        limiter: Arc::new(services::rate_limit::SlidingWindowLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window,
        )),
        jobs: job_manager,
        processor,
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api::router(state))
        .layer(cors);

    info!("Starting slideshow daemon on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

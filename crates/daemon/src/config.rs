//! Daemon configuration, read from the environment.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use slideshow_engine::render::DEFAULT_ARTIFACT_NAME;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    pub render: RenderConfig,
    pub sources: SourceConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Base URL of the rendering engine's job API.
    pub engine_url: Option<String>,
    pub api_key: Option<String>,
    /// Wall-clock budget for one submitted job.
    pub timeout: Duration,
    pub artifact_name: String,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Signed-URL gateway. Source refs are used as-is when unset.
    pub gateway_url: Option<String>,
    pub gateway_key: Option<String>,
    /// Lifetime requested for each signed URL.
    pub url_expires: Duration,
    /// How long a resolved locator stays cached. Keep below `url_expires`.
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Fallback filter when RUST_LOG is not set (e.g. "info", "slideshow_daemon=debug").
    pub level: String,
    pub json: bool,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(DaemonConfig {
            bind_addr: parse_or(&lookup, "SLIDESHOW_BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 7777)))?,
            db_path: non_empty("SLIDESHOW_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".cache/slideshow.db")),
            render: RenderConfig {
                engine_url: non_empty("RENDER_ENGINE_URL").map(|url| url.trim_end_matches('/').to_string()),
                api_key: non_empty("RENDER_ENGINE_API_KEY"),
                timeout: Duration::from_secs(parse_or(&lookup, "RENDER_TIMEOUT_SECS", 60)?),
                artifact_name: non_empty("RENDER_ARTIFACT_NAME")
                    .unwrap_or_else(|| DEFAULT_ARTIFACT_NAME.to_string()),
            },
            sources: SourceConfig {
                gateway_url: non_empty("SOURCE_GATEWAY_URL").map(|url| url.trim_end_matches('/').to_string()),
                gateway_key: non_empty("SOURCE_GATEWAY_KEY"),
                url_expires: Duration::from_secs(parse_or(&lookup, "SOURCE_URL_EXPIRES_SECS", 3600)?),
                cache_ttl: Duration::from_secs(parse_or(&lookup, "SOURCE_CACHE_TTL_SECS", 3000)?),
                cache_max_entries: parse_or(&lookup, "SOURCE_CACHE_MAX", 1000)?,
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_or(&lookup, "RATE_LIMIT_MAX", 2)?,
                window: Duration::from_secs(parse_or(&lookup, "RATE_LIMIT_WINDOW_SECS", 12 * 60 * 60)?),
            },
            logging: LoggingConfig {
                level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                json: parse_or(&lookup, "LOG_JSON", false)?,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<DaemonConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DaemonConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_match_the_render_route() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:7777");
        assert_eq!(config.render.timeout, Duration::from_secs(60));
        assert_eq!(config.render.artifact_name, "generated.mp4");
        assert!(config.render.engine_url.is_none());
        assert_eq!(config.rate_limit.max_requests, 2);
        assert_eq!(config.rate_limit.window, Duration::from_secs(43_200));
        assert_eq!(config.sources.url_expires, Duration::from_secs(3600));
        assert!(config.sources.cache_ttl < config.sources.url_expires);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("RENDER_ENGINE_URL", "https://render.example/v1/"),
            ("RENDER_TIMEOUT_SECS", "90"),
            ("RATE_LIMIT_MAX", "10"),
            ("LOG_JSON", "true"),
            ("SLIDESHOW_BIND_ADDR", "0.0.0.0:8080"),
        ])
        .unwrap();
        assert_eq!(config.render.engine_url.as_deref(), Some("https://render.example/v1"));
        assert_eq!(config.render.timeout, Duration::from_secs(90));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert!(config.logging.json);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[test]
    fn rejects_unparseable_values() {
        let err = config_from(&[("RENDER_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("RENDER_TIMEOUT_SECS"));
    }
}

//! Turning opaque media/audio refs into locators the render engine can fetch.

use anyhow::{anyhow, Context, Result};
use futures::future::try_join_all;
use serde::Deserialize;
use std::time::Duration;

use slideshow_engine::render::RenderSources;
use slideshow_engine::MediaSegment;

use super::cache::TtlCache;

#[async_trait::async_trait]
pub trait SourceResolver: Send + Sync {
    async fn resolve(&self, source_ref: &str) -> Result<String>;
}

/// Refs are already fetchable locators.
pub struct PassthroughResolver;

#[async_trait::async_trait]
impl SourceResolver for PassthroughResolver {
    async fn resolve(&self, source_ref: &str) -> Result<String> {
        Ok(source_ref.to_string())
    }
}

/// Asks a storage gateway for a time-limited signed URL.
pub struct GatewayResolver {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    expires: Duration,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    url: String,
}

impl GatewayResolver {
    pub fn new(base_url: String, api_key: Option<String>, expires: Duration) -> Self {
        GatewayResolver {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            expires,
        }
    }
}

#[async_trait::async_trait]
impl SourceResolver for GatewayResolver {
    async fn resolve(&self, source_ref: &str) -> Result<String> {
        let expires = self.expires.as_secs().to_string();
        let mut request = self
            .client
            .get(format!("{}/signed-url", self.base_url))
            .query(&[("ref", source_ref), ("expires", expires.as_str())]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach source gateway for {}", source_ref))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Source gateway error: {} - {}", status, error_text));
        }

        let body: SignedUrlResponse = response
            .json()
            .await
            .context("Invalid response format from source gateway")?;
        Ok(body.url)
    }
}

/// Caches resolved locators so repeated renders reuse signed URLs.
pub struct CachedResolver<R> {
    inner: R,
    cache: TtlCache<String, String>,
}

impl<R: SourceResolver> CachedResolver<R> {
    pub fn new(inner: R, max_entries: usize, ttl: Duration) -> Self {
        CachedResolver {
            inner,
            cache: TtlCache::new(max_entries, ttl),
        }
    }
}

#[async_trait::async_trait]
impl<R: SourceResolver> SourceResolver for CachedResolver<R> {
    async fn resolve(&self, source_ref: &str) -> Result<String> {
        let key = source_ref.to_string();
        if let Some(locator) = self.cache.get(&key) {
            return Ok(locator);
        }
        let locator = self.inner.resolve(source_ref).await?;
        self.cache.insert(key, locator.clone());
        Ok(locator)
    }
}

/// Resolve every segment plus the narration track, concurrently.
pub async fn resolve_sources(
    resolver: &dyn SourceResolver,
    segments: &[MediaSegment],
    audio_ref: &str,
) -> Result<RenderSources> {
    let media_lookups = segments.iter().map(|segment| async move {
        let locator = resolver.resolve(&segment.source_ref).await?;
        Ok::<_, anyhow::Error>((segment.id, locator))
    });

    let (media, audio) = tokio::try_join!(try_join_all(media_lookups), resolver.resolve(audio_ref))?;

    Ok(RenderSources {
        media: media.into_iter().collect(),
        audio: Some(audio),
    })
}

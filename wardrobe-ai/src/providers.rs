//! Wardrobe and weather data sources
//!
//! The engine consumes both through traits; concrete storage and weather
//! APIs stay outside the core. Two small implementations ship here: a JSON
//! file wardrobe (used by the CLI) and a TTL cache around any weather source.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};
use wardrobe_common::config::WeatherConfig;
use wardrobe_common::{Error, Result, WardrobeItem, WeatherSnapshot};

#[async_trait]
pub trait WardrobeStore: Send + Sync {
    async fn list(&self, user_id: &str) -> Result<Vec<WardrobeItem>>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions for `city`, or `None` when unavailable
    async fn current(&self, city: &str) -> Option<WeatherSnapshot>;
}

/// Wardrobe file: a bare item list, or items keyed by user id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WardrobeFile {
    Shared(Vec<WardrobeItem>),
    PerUser(HashMap<String, Vec<WardrobeItem>>),
}

/// Wardrobe backed by a JSON file, re-read on every call
#[derive(Debug, Clone)]
pub struct JsonWardrobeStore {
    path: PathBuf,
}

impl JsonWardrobeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WardrobeStore for JsonWardrobeStore {
    async fn list(&self, user_id: &str) -> Result<Vec<WardrobeItem>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let file: WardrobeFile = serde_json::from_str(&content)
            .map_err(|e| Error::Parse(format!("{}: {}", self.path.display(), e)))?;

        let items = match file {
            WardrobeFile::Shared(items) => items,
            WardrobeFile::PerUser(mut users) => users
                .remove(user_id)
                .ok_or_else(|| Error::NotFound(format!("wardrobe for user {}", user_id)))?,
        };
        debug!(user = %user_id, items = items.len(), "Wardrobe loaded");
        Ok(items)
    }
}

/// Weather provider returning one fixed snapshot for every city
#[derive(Debug, Clone)]
pub struct StaticWeather {
    snapshot: WeatherSnapshot,
}

impl StaticWeather {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn current(&self, city: &str) -> Option<WeatherSnapshot> {
        let mut snapshot = self.snapshot.clone();
        snapshot.city = city.to_string();
        Some(snapshot)
    }
}

/// Per-city TTL cache around another provider
///
/// Meant for long-lived callers that ask for the same city repeatedly; the
/// one-shot CLI reads its weather once and skips the cache. Failed lookups
/// are not cached.
pub struct CachedWeatherProvider<P> {
    inner: P,
    ttl: Duration,
    cache: Mutex<HashMap<String, (Instant, WeatherSnapshot)>>,
}

impl<P: WeatherProvider> CachedWeatherProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// TTL from `[weather] cache_ttl_secs`
    pub fn from_config(inner: P, config: &WeatherConfig) -> Self {
        Self::new(inner, Duration::from_secs(config.cache_ttl_secs))
    }
}

#[async_trait]
impl<P: WeatherProvider> WeatherProvider for CachedWeatherProvider<P> {
    async fn current(&self, city: &str) -> Option<WeatherSnapshot> {
        let mut cache = self.cache.lock().await;

        if let Some((fetched_at, snapshot)) = cache.get(city) {
            if fetched_at.elapsed() < self.ttl {
                debug!(city = %city, "Weather cache hit");
                return Some(snapshot.clone());
            }
        }

        let snapshot = self.inner.current(city).await?;
        info!(city = %city, temperature = snapshot.temperature, "Weather refreshed");
        cache.insert(city.to_string(), (Instant::now(), snapshot.clone()));
        Some(snapshot)
    }
}

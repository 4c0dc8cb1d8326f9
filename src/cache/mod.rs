//! Durable key-value storage with per-key expiration.
//!
//! The orchestrator treats the cache as best-effort: reads that fail are
//! reported as absent and writes that fail are logged and dropped. The JSON
//! helpers below encode that policy so call sites stay short.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::config::{CacheBackend, CacheConfig};
use crate::error::Result;

pub use self::memory::InMemoryCache;
pub use self::redis::RedisCache;

/// Key of the most recent processed batch
pub const LATEST_BATCH_KEY: &str = "latest-batch";

/// Key of an entity's score history
pub fn history_key(entity_id: &str) -> String {
    format!("history:{entity_id}")
}

#[async_trait]
pub trait DurableCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`; it expires after `ttl` (advisory).
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Returns whether a key was removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Read and decode a JSON value. Any failure is logged and reported as absent.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn DurableCache, key: &str) -> Option<T> {
    match probe_json(cache, key).await {
        Ok(value) => value,
        Err(e) => {
            error!(key, "Cache read failed: {}", e);
            None
        }
    }
}

/// Like [`get_json`] but hands the read or decode error to the caller.
pub async fn probe_json<T: DeserializeOwned>(
    cache: &dyn DurableCache,
    key: &str,
) -> Result<Option<T>> {
    match cache.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode and store a JSON value. Returns false (after logging) on failure.
pub async fn set_json<T: Serialize + ?Sized>(
    cache: &dyn DurableCache,
    key: &str,
    value: &T,
    ttl: Duration,
) -> bool {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            error!(key, "Cache value serialization failed: {}", e);
            return false;
        }
    };
    match cache.set(key, raw, ttl).await {
        Ok(()) => true,
        Err(e) => {
            warn!(key, "Cache write failed, dropping: {}", e);
            false
        }
    }
}

/// Build the configured backend.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn DurableCache>> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(InMemoryCache::new())),
        CacheBackend::Redis => {
            let cache = RedisCache::connect(&config.redis_url, config.key_prefix.clone()).await?;
            Ok(Arc::new(cache))
        }
    }
}

use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::cache::DurableCache;
use crate::error::{CredintError, Result};

/// Redis-backed cache. TTLs map to `SET EX`.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
    prefix: Option<String>,
}

impl RedisCache {
    #[tracing::instrument(level = "debug", skip(url))]
    pub async fn connect(url: &str, prefix: Option<String>) -> Result<Self> {
        let client = ::redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        info!("Connected to redis cache");
        Ok(Self { manager, prefix })
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(CredintError::Validation("cache key is empty".to_string()));
        }
        if key.contains(char::is_whitespace) {
            return Err(CredintError::Validation(format!(
                "cache key must not contain whitespace: {key:?}"
            )));
        }
        Ok(())
    }

    fn scoped(&self, key: &str) -> Result<String> {
        Self::validate_key(key)?;
        Ok(scoped_key(self.prefix.as_deref(), key))
    }
}

fn scoped_key(prefix: Option<&str>, key: &str) -> String {
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => format!("{p}:{key}"),
        None => key.to_string(),
    }
}

#[async_trait]
impl DurableCache for RedisCache {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.scoped(key)?;
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    #[tracing::instrument(level = "debug", skip(self, value))]
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let key = self.scoped(key)?;
        let mut conn = self.manager.clone();
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await?;
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn delete(&self, key: &str) -> Result<bool> {
        let key = self.scoped(key)?;
        let mut conn = self.manager.clone();
        let removed: u64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}

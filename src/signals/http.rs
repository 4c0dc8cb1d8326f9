use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::domain::{FinancialMetrics, MacroSnapshot, SentimentSignal};
use crate::error::{CredintError, Result};
use crate::signals::SignalSource;

/// Client for a provider gateway exposing
/// `/financial/{id}`, `/sentiment/{id}` and `/macro` as JSON.
pub struct HttpSignalSource {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpSignalSource {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("credint/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn entity_endpoint(&self, kind: &str, entity_id: &str) -> Result<String> {
        let valid = !entity_id.is_empty()
            && entity_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));
        if !valid {
            return Err(CredintError::Validation(format!(
                "entity id not url-safe: {entity_id:?}"
            )));
        }
        Ok(self.endpoint(&format!("{kind}/{entity_id}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("provider returned error for {url}"))?;

        let body = resp
            .json::<T>()
            .await
            .with_context(|| format!("invalid JSON from {url}"))?;
        debug!(url, "Fetched provider payload");
        Ok(body)
    }
}

#[async_trait]
impl SignalSource for HttpSignalSource {
    async fn fetch_financial(&self, entity_id: &str) -> Result<FinancialMetrics> {
        let url = self.entity_endpoint("financial", entity_id)?;
        self.get_json(&url).await
    }

    async fn fetch_sentiment(&self, entity_id: &str) -> Result<SentimentSignal> {
        let url = self.entity_endpoint("sentiment", entity_id)?;
        self.get_json(&url).await
    }

    async fn fetch_macro(&self) -> Result<MacroSnapshot> {
        let url = self.endpoint("macro");
        self.get_json(&url).await
    }
}

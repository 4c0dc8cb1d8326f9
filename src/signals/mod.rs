//! Signal acquisition.
//!
//! A [`SignalSource`] fetches raw records; the [`SignalCollector`] fans those
//! fetches out for every tracked entity, bounds each call with a timeout and
//! turns failures into missing signals so one slow provider never stalls or
//! aborts a refresh.

pub mod http;
pub mod simulated;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{SignalSourceKind, SignalsConfig};
use crate::domain::{FinancialMetrics, MacroSnapshot, SentimentSignal, SignalSet};
use crate::error::{CredintError, Result};

pub use self::http::HttpSignalSource;
pub use self::simulated::SimulatedSignalSource;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_financial(&self, entity_id: &str) -> Result<FinancialMetrics>;

    async fn fetch_sentiment(&self, entity_id: &str) -> Result<SentimentSignal>;

    async fn fetch_macro(&self) -> Result<MacroSnapshot>;
}

/// Build the configured source.
pub fn build_source(config: &SignalsConfig) -> Result<Arc<dyn SignalSource>> {
    match config.source {
        SignalSourceKind::Simulated => Ok(Arc::new(SimulatedSignalSource::new())),
        SignalSourceKind::Http => {
            let base_url = config.base_url.as_deref().ok_or_else(|| {
                CredintError::Validation("signals.base_url is not set".to_string())
            })?;
            let source =
                HttpSignalSource::new(base_url, config.api_key.clone(), config.fetch_timeout())?;
            Ok(Arc::new(source))
        }
    }
}

/// Fetches the full signal set for a fixed list of entities.
pub struct SignalCollector {
    source: Arc<dyn SignalSource>,
    entities: Vec<String>,
    fetch_timeout: Duration,
}

impl SignalCollector {
    pub fn new(source: Arc<dyn SignalSource>, entities: Vec<String>, fetch_timeout: Duration) -> Self {
        let mut seen = HashSet::new();
        let entities = entities
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty() && seen.insert(e.clone()))
            .collect();
        Self {
            source,
            entities,
            fetch_timeout,
        }
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// Financial and sentiment for every entity plus one macro snapshot.
    /// Never fails; unavailable signals are simply absent or defaulted.
    pub async fn collect(&self) -> SignalSet {
        info!("Starting signal collection for {} entities", self.entities.len());

        let per_entity = join_all(self.entities.iter().map(|id| self.collect_entity(id)));
        let (results, macro_snapshot) = tokio::join!(per_entity, self.collect_macro());

        let mut set = SignalSet {
            macro_snapshot,
            ..Default::default()
        };
        for (id, financial, sentiment) in results {
            if let Some(f) = financial {
                set.financial.insert(id.clone(), f);
            }
            if let Some(s) = sentiment {
                set.sentiment.insert(id, s);
            }
        }
        if !set.financial.is_empty() {
            set.fetched_at = Some(Utc::now());
        }

        info!(
            "Signal collection completed: {} financial, {} sentiment",
            set.financial.len(),
            set.sentiment.len()
        );
        set
    }

    /// Signals for a single entity, with defaults for anything unavailable.
    pub async fn collect_one(
        &self,
        entity_id: &str,
    ) -> (FinancialMetrics, SentimentSignal, MacroSnapshot) {
        let ((_, financial, sentiment), macro_snapshot) =
            tokio::join!(self.collect_entity(entity_id), self.collect_macro());
        (
            financial.unwrap_or_default(),
            sentiment.unwrap_or_default(),
            macro_snapshot,
        )
    }

    async fn collect_entity(
        &self,
        entity_id: &str,
    ) -> (String, Option<FinancialMetrics>, Option<SentimentSignal>) {
        let (financial, sentiment) = tokio::join!(
            self.bounded("financial", entity_id, self.source.fetch_financial(entity_id)),
            self.bounded("sentiment", entity_id, self.source.fetch_sentiment(entity_id)),
        );
        (entity_id.to_string(), financial, sentiment)
    }

    async fn collect_macro(&self) -> MacroSnapshot {
        self.bounded("macro", "*", self.source.fetch_macro())
            .await
            .unwrap_or_default()
    }

    async fn bounded<T, F>(&self, kind: &str, entity_id: &str, fut: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(Ok(value)) => {
                debug!(entity = entity_id, kind, "Signal fetched");
                Some(value)
            }
            Ok(Err(e)) => {
                warn!(entity = entity_id, kind, "Signal fetch failed: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    entity = entity_id,
                    kind,
                    "Signal fetch timed out after {:?}",
                    self.fetch_timeout
                );
                None
            }
        }
    }
}

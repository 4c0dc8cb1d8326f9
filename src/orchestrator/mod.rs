//! Refresh pipeline: collect signals, score every entity on the blocking
//! pool, persist the batch and append per-entity history.
//!
//! Nothing here returns an error. Provider outages, scoring failures and
//! cache outages all degrade into smaller or stale results.
//!
//! A refresh runs on its own task. Callers only await its result, so a
//! caller that goes away (dropped HTTP request, timeout) leaves the cycle
//! running to completion.

pub mod guard;
pub mod history;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::cache::{get_json, history_key, set_json, DurableCache, LATEST_BATCH_KEY};
use crate::config::RefreshConfig;
use crate::domain::{
    CacheStatus, HistoryEntry, ProcessedBatch, RefreshPhase, RefreshStatus, ScoreResult,
    SignalSet,
};
use crate::scoring::Scorer;
use crate::services::metrics::RefreshMetrics;
use crate::signals::SignalCollector;

pub use self::guard::RefreshGuard;

/// Persistence knobs of the refresh pipeline
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub latest_ttl: Duration,
    pub history_ttl: Duration,
    pub history_capacity: usize,
    pub history_window: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from(&RefreshConfig::default())
    }
}

impl From<&RefreshConfig> for RefreshSettings {
    fn from(config: &RefreshConfig) -> Self {
        Self {
            latest_ttl: config.latest_ttl(),
            history_ttl: config.history_ttl(),
            history_capacity: config.history_capacity,
            history_window: config.history_window,
        }
    }
}

pub struct Orchestrator {
    collector: SignalCollector,
    scorer: Arc<Scorer>,
    cache: Arc<dyn DurableCache>,
    settings: RefreshSettings,
    running: Arc<AtomicBool>,
    last_success: RwLock<Option<DateTime<Utc>>>,
    metrics: Arc<RefreshMetrics>,
}

impl Orchestrator {
    pub fn new(
        collector: SignalCollector,
        scorer: Arc<Scorer>,
        cache: Arc<dyn DurableCache>,
        settings: RefreshSettings,
        metrics: Arc<RefreshMetrics>,
    ) -> Self {
        Self {
            collector,
            scorer,
            cache,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            last_success: RwLock::new(None),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<RefreshMetrics> {
        &self.metrics
    }

    pub fn entities(&self) -> &[String] {
        self.collector.entities()
    }

    pub fn is_refreshing(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run one full refresh. A call that overlaps a running refresh returns
    /// the last persisted batch (or an empty one) without doing any work.
    pub async fn refresh_all(self: &Arc<Self>) -> ProcessedBatch {
        let Some(guard) = RefreshGuard::try_acquire(&self.running) else {
            warn!("Refresh already in progress, returning last persisted batch");
            self.metrics.inc_skipped();
            return self.cached_batch().await.unwrap_or_else(ProcessedBatch::empty);
        };

        let run_id = Uuid::new_v4();
        let this = Arc::clone(self);
        let cycle = tokio::spawn(
            async move {
                let _guard = guard;
                this.run_refresh().await
            }
            .instrument(info_span!("refresh", %run_id)),
        );

        match cycle.await {
            Ok(batch) => batch,
            Err(e) => {
                error!(%run_id, "Refresh task failed: {}", e);
                ProcessedBatch::empty()
            }
        }
    }

    async fn run_refresh(&self) -> ProcessedBatch {
        let started = Instant::now();
        self.metrics.inc_started();
        info!("Starting score refresh");

        let signals = self.collector.collect().await;
        if !signals.has_financial_data() {
            error!("No financial data available, skipping scoring");
            self.metrics.inc_empty();
            return ProcessedBatch::empty();
        }

        let scores = self.score_all(&signals).await;
        let batch = ProcessedBatch::new(scores, signals.fetched_at);

        let mut write_failures = 0u64;
        if !set_json(
            self.cache.as_ref(),
            LATEST_BATCH_KEY,
            &batch,
            self.settings.latest_ttl,
        )
        .await
        {
            write_failures += 1;
        }
        write_failures += self.append_history(&batch).await;
        if write_failures > 0 {
            warn!(write_failures, "Batch returned without full persistence");
            self.metrics.add_cache_write_failures(write_failures);
        }

        *self.last_success.write().await = Some(Utc::now());
        self.metrics.record_completion(&batch, started.elapsed());
        info!(
            entities = batch.entity_count,
            fallbacks = batch.fallback_count(),
            "Score refresh completed in {:?}",
            started.elapsed()
        );
        batch
    }

    /// One blocking task per scoreable entity; failed tasks are omitted.
    async fn score_all(&self, signals: &SignalSet) -> BTreeMap<String, ScoreResult> {
        let macro_snapshot = Arc::new(signals.macro_snapshot.clone());

        let (ids, tasks): (Vec<_>, Vec<_>) = signals
            .scoreable()
            .map(|(id, financial)| {
                let scorer = Arc::clone(&self.scorer);
                let macro_snapshot = Arc::clone(&macro_snapshot);
                let entity_id = id.clone();
                let financial = financial.clone();
                let sentiment = signals.sentiment_for(id);
                let task = tokio::task::spawn_blocking(move || {
                    scorer.score(&entity_id, &financial, &sentiment, &macro_snapshot)
                });
                (id.clone(), task)
            })
            .unzip();

        let skipped = signals.financial.len() - ids.len();
        if skipped > 0 {
            debug!(skipped, "Entities without usable financial data");
        }

        let mut scores = BTreeMap::new();
        for (id, joined) in ids.into_iter().zip(join_all(tasks).await) {
            match joined {
                Ok(result) => {
                    scores.insert(id, result);
                }
                Err(e) => {
                    error!(entity = %id, "Scoring task failed: {}", e);
                    self.metrics.inc_scoring_failures();
                }
            }
        }
        scores
    }

    /// Returns the number of history writes that were dropped.
    async fn append_history(&self, batch: &ProcessedBatch) -> u64 {
        let now = Utc::now();
        let writes = batch
            .scores
            .iter()
            .map(|(id, result)| self.append_entry(id, HistoryEntry::observe(result, now)));
        join_all(writes).await.into_iter().filter(|ok| !ok).count() as u64
    }

    async fn append_entry(&self, entity_id: &str, entry: HistoryEntry) -> bool {
        let key = history_key(entity_id);
        let mut entries: Vec<HistoryEntry> = get_json(self.cache.as_ref(), &key)
            .await
            .unwrap_or_default();
        history::push_bounded(&mut entries, entry, self.settings.history_capacity);
        set_json(self.cache.as_ref(), &key, &entries, self.settings.history_ttl).await
    }

    async fn cached_batch(&self) -> Option<ProcessedBatch> {
        get_json(self.cache.as_ref(), LATEST_BATCH_KEY).await
    }

    /// Latest persisted batch; runs a refresh on a cold cache.
    pub async fn get_latest(self: &Arc<Self>) -> ProcessedBatch {
        if let Some(batch) = self.cached_batch().await {
            return batch;
        }
        info!("No cached batch, running cold-start refresh");
        self.refresh_all().await
    }

    /// Most recent history entries for an entity, oldest first.
    pub async fn get_history(&self, entity_id: &str) -> Vec<HistoryEntry> {
        let entries: Vec<HistoryEntry> = get_json(self.cache.as_ref(), &history_key(entity_id))
            .await
            .unwrap_or_default();
        history::recent(&entries, self.settings.history_window).to_vec()
    }

    pub async fn get_status(&self) -> RefreshStatus {
        let cache_status = match self.cache.get(LATEST_BATCH_KEY).await {
            Ok(Some(_)) => CacheStatus::Connected,
            Ok(None) => CacheStatus::Empty,
            Err(e) => {
                warn!("Cache health probe failed: {}", e);
                CacheStatus::Error
            }
        };
        let processing = self.is_refreshing();

        RefreshStatus {
            processing,
            phase: if processing {
                RefreshPhase::Running
            } else {
                RefreshPhase::Idle
            },
            last_update: *self.last_success.read().await,
            cache_status,
            timestamp: Utc::now(),
        }
    }

    /// Fresh score for one entity, outside the refresh cycle. Not persisted.
    pub async fn score_one(&self, entity_id: &str) -> ScoreResult {
        let (financial, sentiment, macro_snapshot) = self.collector.collect_one(entity_id).await;
        let scorer = Arc::clone(&self.scorer);
        let id = entity_id.to_string();
        match tokio::task::spawn_blocking(move || {
            scorer.score(&id, &financial, &sentiment, &macro_snapshot)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(entity = entity_id, "Scoring task failed: {}", e);
                Scorer::fallback_score(entity_id, &Default::default(), &Default::default())
            }
        }
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::info;

use crate::domain::ProcessedBatch;

/// Metrics collector for the refresh pipeline
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Refreshes that acquired the single-flight guard
    pub refreshes_started: AtomicU64,
    /// Refreshes that produced and stored a batch
    pub refreshes_completed: AtomicU64,
    /// Calls short-circuited because a refresh was in flight
    pub refreshes_skipped: AtomicU64,
    /// Refreshes that found no financial data at all
    pub refreshes_empty: AtomicU64,
    /// Entities scored across all refreshes
    pub entities_scored: AtomicU64,
    /// Scores produced by the rule-based path
    pub fallback_scores: AtomicU64,
    /// Scoring tasks that did not return a result
    pub scoring_failures: AtomicU64,
    /// Cache writes that were dropped
    pub cache_write_failures: AtomicU64,
    /// Duration of the last completed refresh
    last_refresh_ms: AtomicU64,
    /// Entity count of the last completed refresh
    last_entity_count: AtomicU64,
}

impl RefreshMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_started(&self) {
        self.refreshes_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_skipped(&self) {
        self.refreshes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_empty(&self) {
        self.refreshes_empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_scoring_failures(&self) {
        self.scoring_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_cache_write_failures(&self, n: u64) {
        self.cache_write_failures.fetch_add(n, Ordering::Relaxed);
    }

    /// Record a completed refresh
    pub fn record_completion(&self, batch: &ProcessedBatch, elapsed: Duration) {
        self.refreshes_completed.fetch_add(1, Ordering::Relaxed);
        self.entities_scored
            .fetch_add(batch.entity_count as u64, Ordering::Relaxed);
        self.fallback_scores
            .fetch_add(batch.fallback_count() as u64, Ordering::Relaxed);
        self.last_refresh_ms
            .store(elapsed.as_millis() as u64, Ordering::Relaxed);
        self.last_entity_count
            .store(batch.entity_count as u64, Ordering::Relaxed);
    }

    pub fn summary(&self) -> String {
        format!(
            "refreshes: {} started / {} completed / {} skipped / {} empty | entities: {} (last {}) | fallbacks: {} | task failures: {} | cache write failures: {} | last refresh: {}ms",
            self.refreshes_started.load(Ordering::Relaxed),
            self.refreshes_completed.load(Ordering::Relaxed),
            self.refreshes_skipped.load(Ordering::Relaxed),
            self.refreshes_empty.load(Ordering::Relaxed),
            self.entities_scored.load(Ordering::Relaxed),
            self.last_entity_count.load(Ordering::Relaxed),
            self.fallback_scores.load(Ordering::Relaxed),
            self.scoring_failures.load(Ordering::Relaxed),
            self.cache_write_failures.load(Ordering::Relaxed),
            self.last_refresh_ms.load(Ordering::Relaxed),
        )
    }

    /// Export metrics in Prometheus format
    pub fn prometheus(&self, refreshing: bool) -> String {
        format!(
            r#"# HELP credint_refreshes_started_total Refreshes that acquired the guard
# TYPE credint_refreshes_started_total counter
credint_refreshes_started_total {}

# HELP credint_refreshes_completed_total Refreshes that produced a batch
# TYPE credint_refreshes_completed_total counter
credint_refreshes_completed_total {}

# HELP credint_refreshes_skipped_total Refresh calls short-circuited by single-flight
# TYPE credint_refreshes_skipped_total counter
credint_refreshes_skipped_total {}

# HELP credint_refreshes_empty_total Refreshes with no financial data
# TYPE credint_refreshes_empty_total counter
credint_refreshes_empty_total {}

# HELP credint_entities_scored_total Entities scored
# TYPE credint_entities_scored_total counter
credint_entities_scored_total {}

# HELP credint_fallback_scores_total Scores produced by rule-based fallback
# TYPE credint_fallback_scores_total counter
credint_fallback_scores_total {}

# HELP credint_scoring_failures_total Scoring tasks without a result
# TYPE credint_scoring_failures_total counter
credint_scoring_failures_total {}

# HELP credint_cache_write_failures_total Dropped cache writes
# TYPE credint_cache_write_failures_total counter
credint_cache_write_failures_total {}

# HELP credint_last_refresh_duration_ms Duration of the last completed refresh
# TYPE credint_last_refresh_duration_ms gauge
credint_last_refresh_duration_ms {}

# HELP credint_last_entity_count Entities in the last completed batch
# TYPE credint_last_entity_count gauge
credint_last_entity_count {}

# HELP credint_refresh_in_progress Whether a refresh is running
# TYPE credint_refresh_in_progress gauge
credint_refresh_in_progress {}
"#,
            self.refreshes_started.load(Ordering::Relaxed),
            self.refreshes_completed.load(Ordering::Relaxed),
            self.refreshes_skipped.load(Ordering::Relaxed),
            self.refreshes_empty.load(Ordering::Relaxed),
            self.entities_scored.load(Ordering::Relaxed),
            self.fallback_scores.load(Ordering::Relaxed),
            self.scoring_failures.load(Ordering::Relaxed),
            self.cache_write_failures.load(Ordering::Relaxed),
            self.last_refresh_ms.load(Ordering::Relaxed),
            self.last_entity_count.load(Ordering::Relaxed),
            u8::from(refreshing),
        )
    }

    /// Log periodic status
    pub fn log_status(&self) {
        info!("{}", self.summary());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ScoreResult, FALLBACK_SENTINEL};
    use std::collections::BTreeMap;

    #[test]
    fn test_completion_updates_counters() {
        let metrics = RefreshMetrics::new();
        let mut scores = BTreeMap::new();
        scores.insert(
            "A".to_string(),
            ScoreResult::new("A", 700.0, BTreeMap::new(), String::new()),
        );
        scores.insert(
            "B".to_string(),
            ScoreResult::new(
                "B",
                500.0,
                BTreeMap::from([(FALLBACK_SENTINEL.to_string(), 1.0)]),
                String::new(),
            ),
        );
        let batch = ProcessedBatch::new(scores, None);

        metrics.inc_started();
        metrics.record_completion(&batch, Duration::from_millis(42));

        assert_eq!(metrics.entities_scored.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.fallback_scores.load(Ordering::Relaxed), 1);
        let text = metrics.prometheus(false);
        assert!(text.contains("credint_refreshes_completed_total 1"));
        assert!(text.contains("credint_last_refresh_duration_ms 42"));
        assert!(text.contains("credint_refresh_in_progress 0"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{HistoryEntry, ProcessedBatch, RiskTier};

// ============================================================================
// System Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub uptime_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshAccepted {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Score Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub entity_id: String,
    pub history: Vec<HistoryEntry>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity_id: String,
    pub score: f64,
    pub risk_level: RiskTier,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesResponse {
    pub entities: Vec<EntitySummary>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

impl EntitiesResponse {
    /// Summaries sorted by score, best first.
    pub fn from_batch(batch: &ProcessedBatch) -> Self {
        let mut entities: Vec<EntitySummary> = batch
            .scores
            .values()
            .map(|s| EntitySummary {
                entity_id: s.entity_id.clone(),
                score: s.score,
                risk_level: s.risk_level,
                last_updated: s.timestamp,
            })
            .collect();
        entities.sort_by(|a, b| b.score.total_cmp(&a.score));

        Self {
            count: entities.len(),
            entities,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Analytics Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analytics {
    pub total_entities: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub risk_distribution: BTreeMap<String, usize>,
    pub last_updated: DateTime<Utc>,
    pub timestamp: DateTime<Utc>,
}

impl Analytics {
    /// `None` for a batch without scores.
    pub fn from_batch(batch: &ProcessedBatch) -> Option<Self> {
        if batch.is_empty() {
            return None;
        }

        let scores: Vec<f64> = batch.scores.values().map(|s| s.score).collect();
        let total = scores.len();
        let mut risk_distribution = BTreeMap::new();
        for result in batch.scores.values() {
            *risk_distribution
                .entry(result.risk_level.label().to_string())
                .or_insert(0) += 1;
        }

        Some(Self {
            total_entities: total,
            average_score: scores.iter().sum::<f64>() / total as f64,
            highest_score: scores.iter().copied().fold(f64::MIN, f64::max),
            lowest_score: scores.iter().copied().fold(f64::MAX, f64::min),
            risk_distribution,
            last_updated: batch.processing_timestamp,
            timestamp: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoData {
    pub message: String,
}

impl Default for NoData {
    fn default() -> Self {
        Self {
            message: "No data available".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ScoreResult;

    fn batch(scores: &[(&str, f64)]) -> ProcessedBatch {
        ProcessedBatch::new(
            scores
                .iter()
                .map(|(id, s)| {
                    (
                        id.to_string(),
                        ScoreResult::new(*id, *s, BTreeMap::new(), String::new()),
                    )
                })
                .collect(),
            None,
        )
    }

    #[test]
    fn test_entities_sorted_by_score_descending() {
        let resp = EntitiesResponse::from_batch(&batch(&[("A", 300.0), ("B", 900.0), ("C", 600.0)]));
        let order: Vec<_> = resp.entities.iter().map(|e| e.entity_id.as_str()).collect();
        assert_eq!(order, ["B", "C", "A"]);
        assert_eq!(resp.count, 3);
    }

    #[test]
    fn test_analytics_summarise_batch() {
        let a = Analytics::from_batch(&batch(&[("A", 300.0), ("B", 900.0), ("C", 600.0)])).unwrap();
        assert_eq!(a.total_entities, 3);
        assert_eq!(a.average_score, 600.0);
        assert_eq!(a.highest_score, 900.0);
        assert_eq!(a.lowest_score, 300.0);
        assert_eq!(a.risk_distribution["Low Risk"], 1);
        assert_eq!(a.risk_distribution["Medium Risk"], 1);
        assert_eq!(a.risk_distribution["High Risk"], 1);
    }

    #[test]
    fn test_analytics_absent_for_empty_batch() {
        assert!(Analytics::from_batch(&ProcessedBatch::empty()).is_none());
    }
}

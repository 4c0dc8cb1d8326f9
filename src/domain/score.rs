use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lower bound of the score scale
pub const SCORE_MIN: f64 = 0.0;
/// Upper bound of the score scale
pub const SCORE_MAX: f64 = 1000.0;

/// Scores at or above this are `Low` risk
pub const LOW_RISK_THRESHOLD: f64 = 750.0;
/// Scores at or above this (and below `LOW_RISK_THRESHOLD`) are `Medium` risk
pub const MEDIUM_RISK_THRESHOLD: f64 = 500.0;

/// Contribution key that marks a result produced by rule-based scoring
pub const FALLBACK_SENTINEL: &str = "fallback";

/// Clamp a raw score onto the published scale.
pub fn clamp_score(raw: f64) -> f64 {
    raw.clamp(SCORE_MIN, SCORE_MAX)
}

/// Risk tier, a pure function of the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score >= LOW_RISK_THRESHOLD {
            RiskTier::Low
        } else if score >= MEDIUM_RISK_THRESHOLD {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }

    /// Dashboard color
    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "green",
            RiskTier::Medium => "yellow",
            RiskTier::High => "red",
        }
    }

    /// One-sentence summary used in explanations
    pub fn remark(&self) -> &'static str {
        match self {
            RiskTier::Low => "Strong creditworthiness.",
            RiskTier::Medium => "Moderate credit risk.",
            RiskTier::High => "Higher credit risk concerns.",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entity's outcome of a scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub entity_id: String,
    pub score: f64,
    pub risk_level: RiskTier,
    pub color: String,
    pub contributions: BTreeMap<String, f64>,
    pub explanation: String,
    pub timestamp: DateTime<Utc>,
}

impl ScoreResult {
    /// Build a result; the score is clamped and tier/color derived from it.
    pub fn new(
        entity_id: impl Into<String>,
        score: f64,
        contributions: BTreeMap<String, f64>,
        explanation: String,
    ) -> Self {
        let score = clamp_score(score);
        let tier = RiskTier::from_score(score);
        Self {
            entity_id: entity_id.into(),
            score,
            risk_level: tier,
            color: tier.color().to_string(),
            contributions,
            explanation,
            timestamp: Utc::now(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.contributions.contains_key(FALLBACK_SENTINEL)
    }
}

/// The outcome of one full refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBatch {
    pub scores: BTreeMap<String, ScoreResult>,
    pub data_timestamp: Option<DateTime<Utc>>,
    pub processing_timestamp: DateTime<Utc>,
    pub entity_count: usize,
}

impl ProcessedBatch {
    pub fn new(
        scores: BTreeMap<String, ScoreResult>,
        data_timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        let entity_count = scores.len();
        Self {
            scores,
            data_timestamp,
            processing_timestamp: Utc::now(),
            entity_count,
        }
    }

    pub fn empty() -> Self {
        Self::new(BTreeMap::new(), None)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn get(&self, entity_id: &str) -> Option<&ScoreResult> {
        self.scores.get(entity_id)
    }

    pub fn fallback_count(&self) -> usize {
        self.scores.values().filter(|s| s.is_fallback()).count()
    }
}

/// One timestamped observation for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub score: f64,
    pub risk_level: RiskTier,
}

impl HistoryEntry {
    pub fn observe(result: &ScoreResult, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: at,
            score: result.score,
            risk_level: result.risk_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(RiskTier::from_score(800.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(750.0), RiskTier::Low);
        assert_eq!(RiskTier::from_score(749.9), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(600.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(500.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_score(300.0), RiskTier::High);
        assert_eq!(RiskTier::from_score(0.0), RiskTier::High);
    }

    #[test]
    fn test_tier_serializes_as_label() {
        let json = serde_json::to_string(&RiskTier::Low).unwrap();
        assert_eq!(json, "\"Low Risk\"");
        let back: RiskTier = serde_json::from_str("\"High Risk\"").unwrap();
        assert_eq!(back, RiskTier::High);
    }

    #[test]
    fn test_score_result_clamps_and_derives_tier() {
        let high = ScoreResult::new("ACME", 1250.0, BTreeMap::new(), String::new());
        assert_eq!(high.score, 1000.0);
        assert_eq!(high.risk_level, RiskTier::Low);
        assert_eq!(high.color, "green");

        let low = ScoreResult::new("ACME", -40.0, BTreeMap::new(), String::new());
        assert_eq!(low.score, 0.0);
        assert_eq!(low.risk_level, RiskTier::High);
        assert_eq!(low.color, "red");
    }

    #[test]
    fn test_batch_count_tracks_entries() {
        let mut scores = BTreeMap::new();
        for id in ["A", "B", "C"] {
            scores.insert(
                id.to_string(),
                ScoreResult::new(id, 600.0, BTreeMap::new(), String::new()),
            );
        }
        let batch = ProcessedBatch::new(scores, Some(Utc::now()));
        assert_eq!(batch.entity_count, 3);
        assert!(ProcessedBatch::empty().is_empty());
        assert_eq!(ProcessedBatch::empty().entity_count, 0);
    }
}

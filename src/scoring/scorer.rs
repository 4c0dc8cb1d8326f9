//! Signals -> explainable credit score.
//!
//! `Scorer::score` never fails. The model path can reject its inputs
//! (dimension mismatch, non-finite output) or panic inside a model
//! implementation; either way the caller gets a rule-based score instead.
//!
//! Contributions are `scaled_value × importance × 100`: a linear attribution
//! heuristic over static importances. It is not a causal or Shapley
//! decomposition and does not sum to the score.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{
    clamp_score, FinancialMetrics, MacroSnapshot, RiskTier, ScoreResult, SentimentSignal,
    FALLBACK_SENTINEL, FEATURE_COUNT, FEATURE_NAMES,
};
use crate::error::{ModelError, Result};
use crate::ml::{ModelArtifact, ScoringModel, StandardScaler};
use crate::scoring::explain::{explain, NEGATIVE_SENTIMENT, POSITIVE_SENTIMENT};
use crate::scoring::features::extract_features;

/// Starting point of rule-based scoring
pub const FALLBACK_BASE_SCORE: f64 = 500.0;

pub struct Scorer {
    model: Arc<dyn ScoringModel>,
    scaler: StandardScaler,
}

impl Scorer {
    pub fn new(model: Arc<dyn ScoringModel>, scaler: StandardScaler) -> Self {
        Self { model, scaler }
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        let (model, scaler) = artifact.into_parts();
        Self::new(Arc::new(model), scaler)
    }

    /// Load the artifact at `path`, or the embedded default when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let artifact = match path {
            Some(p) => ModelArtifact::from_file(p)?,
            None => ModelArtifact::embedded()?,
        };
        Ok(Self::from_artifact(artifact))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Score one entity. Degrades to [`Scorer::fallback_score`] on any
    /// model-path failure.
    pub fn score(
        &self,
        entity_id: &str,
        financial: &FinancialMetrics,
        sentiment: &SentimentSignal,
        macro_snapshot: &MacroSnapshot,
    ) -> ScoreResult {
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            self.model_score(entity_id, financial, sentiment, macro_snapshot)
        }));

        match attempt {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(entity = entity_id, "Model scoring failed, using fallback: {}", e);
                Self::fallback_score(entity_id, financial, sentiment)
            }
            Err(_) => {
                warn!(entity = entity_id, "Model panicked, using fallback");
                Self::fallback_score(entity_id, financial, sentiment)
            }
        }
    }

    fn model_score(
        &self,
        entity_id: &str,
        financial: &FinancialMetrics,
        sentiment: &SentimentSignal,
        macro_snapshot: &MacroSnapshot,
    ) -> std::result::Result<ScoreResult, ModelError> {
        let features = extract_features(financial, sentiment, macro_snapshot);

        // Fail closed if the model was trained on a different feature set.
        if self.model.input_dim() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                got: FEATURE_COUNT,
                expected: self.model.input_dim(),
            });
        }
        let scaled = self.scaler.transform(features.as_slice())?;

        let raw = self.model.predict(&scaled)?;
        if !raw.is_finite() {
            return Err(ModelError::NonFiniteOutput { value: raw });
        }
        let score = round_to(clamp_score(raw), 1);

        let importances = self.model.importances();
        if importances.len() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                got: importances.len(),
                expected: FEATURE_COUNT,
            });
        }

        let ordered: Vec<(&str, f64)> = FEATURE_NAMES
            .iter()
            .zip(scaled.iter().zip(importances))
            .map(|(name, (z, imp))| (*name, round_to(z * imp * 100.0, 2)))
            .collect();

        let tier = RiskTier::from_score(score);
        let explanation = explain(entity_id, score, tier, &ordered, sentiment);
        let contributions: BTreeMap<String, f64> = ordered
            .into_iter()
            .map(|(name, c)| (name.to_string(), c))
            .collect();

        debug!(entity = entity_id, score, tier = %tier, "Model score computed");
        Ok(ScoreResult::new(entity_id, score, contributions, explanation))
    }

    /// Rule-based score from leverage, profitability and sentiment.
    pub fn fallback_score(
        entity_id: &str,
        financial: &FinancialMetrics,
        sentiment: &SentimentSignal,
    ) -> ScoreResult {
        let mut score = FALLBACK_BASE_SCORE;

        let debt_to_equity = financial
            .debt_to_equity
            .filter(|v| v.is_finite())
            .unwrap_or(1.0);
        if debt_to_equity < 0.5 {
            score += 100.0;
        } else if debt_to_equity > 2.0 {
            score -= 150.0;
        }

        let roe = financial.roe.filter(|v| v.is_finite()).unwrap_or(0.0);
        if roe > 0.15 {
            score += 100.0;
        } else if roe < 0.0 {
            score -= 200.0;
        }

        let s = sentiment.sentiment_score;
        if s > POSITIVE_SENTIMENT {
            score += 50.0;
        } else if s < NEGATIVE_SENTIMENT {
            score -= 50.0;
        }

        let score = clamp_score(score);
        let contributions = BTreeMap::from([(FALLBACK_SENTINEL.to_string(), 1.0)]);
        let explanation = format!("Fallback scoring used. Score: {score:.0}/1000");
        ScoreResult::new(entity_id, score, contributions, explanation)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::LinearModel;

    fn stub_scorer(model: LinearModel) -> Scorer {
        Scorer::new(Arc::new(model), StandardScaler::identity(FEATURE_COUNT))
    }

    fn fin(de: f64, roe: f64) -> FinancialMetrics {
        FinancialMetrics {
            debt_to_equity: Some(de),
            roe: Some(roe),
            ..Default::default()
        }
    }

    fn sent(score: f64) -> SentimentSignal {
        SentimentSignal {
            sentiment_score: score,
            ..Default::default()
        }
    }

    struct PanickingModel;

    impl ScoringModel for PanickingModel {
        fn input_dim(&self) -> usize {
            FEATURE_COUNT
        }
        fn predict(&self, _scaled: &[f64]) -> std::result::Result<f64, ModelError> {
            panic!("model exploded")
        }
        fn importances(&self) -> &[f64] {
            &[]
        }
    }

    #[test]
    fn test_tier_matches_model_output() {
        for (raw, tier) in [
            (800.0, RiskTier::Low),
            (600.0, RiskTier::Medium),
            (300.0, RiskTier::High),
        ] {
            let scorer = stub_scorer(LinearModel::constant(raw, FEATURE_COUNT));
            let r = scorer.score(
                "ACME",
                &fin(1.0, 0.1),
                &SentimentSignal::default(),
                &MacroSnapshot::default(),
            );
            assert_eq!(r.score, raw);
            assert_eq!(r.risk_level, tier);
            assert!(!r.is_fallback());
            assert_eq!(r.contributions.len(), FEATURE_COUNT);
            for name in FEATURE_NAMES {
                assert!(r.contributions.contains_key(name));
            }
        }
    }

    #[test]
    fn test_model_output_is_clamped() {
        let high = stub_scorer(LinearModel::constant(5000.0, FEATURE_COUNT)).score(
            "ACME",
            &fin(1.0, 0.1),
            &SentimentSignal::default(),
            &MacroSnapshot::default(),
        );
        assert_eq!(high.score, 1000.0);

        let low = stub_scorer(LinearModel::constant(-12.0, FEATURE_COUNT)).score(
            "ACME",
            &fin(1.0, 0.1),
            &SentimentSignal::default(),
            &MacroSnapshot::default(),
        );
        assert_eq!(low.score, 0.0);
        assert_eq!(low.risk_level, RiskTier::High);
    }

    #[test]
    fn test_contributions_are_scaled_times_importance() {
        let mut importances = vec![0.0; FEATURE_COUNT];
        importances[3] = 0.5; // roe
        let model = LinearModel::new(vec![0.0; FEATURE_COUNT], 700.0, importances);
        let r = stub_scorer(model).score(
            "ACME",
            &fin(1.0, 0.123),
            &SentimentSignal::default(),
            &MacroSnapshot::default(),
        );
        // identity scaler: 0.123 * 0.5 * 100 = 6.15
        assert!((r.contributions["roe"] - 6.15).abs() < 1e-9);
        assert_eq!(r.contributions["vix"], 0.0);
    }

    #[test]
    fn test_dimension_mismatch_falls_back() {
        let scorer = stub_scorer(LinearModel::constant(900.0, FEATURE_COUNT - 1));
        let r = scorer.score(
            "ACME",
            &fin(0.3, 0.2),
            &sent(0.8),
            &MacroSnapshot::default(),
        );
        assert!(r.is_fallback());
        assert_eq!(r.contributions.len(), 1);
        assert_eq!(r.score, 750.0);
    }

    #[test]
    fn test_bad_importances_fall_back() {
        let model = LinearModel::new(vec![0.0; FEATURE_COUNT], 900.0, vec![1.0; 3]);
        let r = stub_scorer(model).score(
            "ACME",
            &fin(1.0, 0.1),
            &SentimentSignal::default(),
            &MacroSnapshot::default(),
        );
        assert!(r.is_fallback());
    }

    #[test]
    fn test_panicking_model_falls_back() {
        let scorer = Scorer::new(
            Arc::new(PanickingModel),
            StandardScaler::identity(FEATURE_COUNT),
        );
        let r = scorer.score(
            "ACME",
            &fin(3.0, -0.1),
            &sent(0.2),
            &MacroSnapshot::default(),
        );
        assert!(r.is_fallback());
        assert_eq!(r.score, 100.0);
    }

    #[test]
    fn test_fallback_scenarios() {
        let strong = Scorer::fallback_score("ACME", &fin(0.3, 0.2), &sent(0.8));
        assert_eq!(strong.score, 750.0);
        assert_eq!(strong.risk_level, RiskTier::Low);
        assert_eq!(strong.risk_level.label(), "Low Risk");
        assert_eq!(
            strong.contributions,
            BTreeMap::from([(FALLBACK_SENTINEL.to_string(), 1.0)])
        );
        assert_eq!(strong.explanation, "Fallback scoring used. Score: 750/1000");

        let weak = Scorer::fallback_score("ACME", &fin(3.0, -0.1), &sent(0.2));
        assert_eq!(weak.score, 100.0);
        assert_eq!(weak.risk_level.label(), "High Risk");
    }

    #[test]
    fn test_fallback_defaults_when_fields_missing() {
        let r = Scorer::fallback_score(
            "ACME",
            &FinancialMetrics::default(),
            &SentimentSignal::default(),
        );
        assert_eq!(r.score, 500.0);
        assert_eq!(r.risk_level, RiskTier::Medium);
    }

    #[test]
    fn test_embedded_model_scores_within_range() {
        let scorer = Scorer::load(None).unwrap();
        let financial = FinancialMetrics {
            market_cap: Some(2.5e12),
            debt_to_equity: Some(1.8),
            current_ratio: Some(0.9),
            roe: Some(1.5),
            price_change_30d: Some(-4.2),
            volatility: Some(6.1),
            avg_volume: Some(5.5e7),
        };
        let sentiment = SentimentSignal {
            sentiment_score: 0.7,
            news_count: 5,
            headlines: vec!["Record quarter".to_string()],
        };
        let macro_snapshot = MacroSnapshot {
            vix: Some(18.0),
            treasury_10y: Some(4.3),
            ..Default::default()
        };
        let r = scorer.score("AAPL", &financial, &sentiment, &macro_snapshot);
        assert!((0.0..=1000.0).contains(&r.score));
        assert_eq!(r.risk_level, RiskTier::from_score(r.score));
        assert!(!r.is_fallback());
        assert!(r.explanation.starts_with("AAPL credit score:"));
        assert!(r.explanation.ends_with("Recent news sentiment is positive."));
    }
}

//! Raw signals -> model feature vector.
//!
//! Every field has a default so partially-missing provider data never aborts
//! scoring. Non-finite values count as missing.

use crate::domain::{FeatureVector, FinancialMetrics, MacroSnapshot, SentimentSignal};

pub const DEFAULT_MARKET_CAP: f64 = 1e9;
pub const MIN_MARKET_CAP: f64 = 1e6;
pub const DEFAULT_DEBT_TO_EQUITY: f64 = 1.0;
pub const MAX_DEBT_TO_EQUITY: f64 = 10.0;
pub const DEFAULT_CURRENT_RATIO: f64 = 1.0;
pub const MIN_CURRENT_RATIO: f64 = 0.1;
pub const DEFAULT_ROE: f64 = 0.1;
pub const DEFAULT_PRICE_CHANGE_30D: f64 = 0.0;
pub const DEFAULT_VOLATILITY: f64 = 1.0;
pub const DEFAULT_AVG_VOLUME: f64 = 1e6;
pub const MIN_AVG_VOLUME: f64 = 1000.0;
pub const DEFAULT_SENTIMENT: f64 = 0.5;
pub const DEFAULT_VIX: f64 = 20.0;
pub const DEFAULT_TREASURY_10Y: f64 = 4.0;

fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Build the 11-feature vector in model order.
pub fn extract_features(
    financial: &FinancialMetrics,
    sentiment: &SentimentSignal,
    macro_snapshot: &MacroSnapshot,
) -> FeatureVector {
    // Floors keep ln() away from zero and negative inputs.
    let market_cap = present(financial.market_cap).unwrap_or(DEFAULT_MARKET_CAP);
    let market_cap_log = market_cap.max(MIN_MARKET_CAP).ln();

    let debt_to_equity = present(financial.debt_to_equity)
        .unwrap_or(DEFAULT_DEBT_TO_EQUITY)
        .min(MAX_DEBT_TO_EQUITY);
    let current_ratio = present(financial.current_ratio)
        .unwrap_or(DEFAULT_CURRENT_RATIO)
        .max(MIN_CURRENT_RATIO);
    let roe = present(financial.roe).unwrap_or(DEFAULT_ROE);
    let price_change_30d = present(financial.price_change_30d).unwrap_or(DEFAULT_PRICE_CHANGE_30D);
    let volatility = present(financial.volatility).unwrap_or(DEFAULT_VOLATILITY);

    let avg_volume = present(financial.avg_volume).unwrap_or(DEFAULT_AVG_VOLUME);
    let volume_avg_log = avg_volume.max(MIN_AVG_VOLUME).ln();

    let sentiment_score = if sentiment.sentiment_score.is_finite() {
        sentiment.sentiment_score.clamp(0.0, 1.0)
    } else {
        DEFAULT_SENTIMENT
    };
    let news_count = f64::from(sentiment.news_count);

    let vix = present(macro_snapshot.vix).unwrap_or(DEFAULT_VIX);
    let treasury_10y = present(macro_snapshot.treasury_10y).unwrap_or(DEFAULT_TREASURY_10Y);

    FeatureVector([
        market_cap_log,
        debt_to_equity,
        current_ratio,
        roe,
        price_change_30d,
        volatility,
        volume_avg_log,
        sentiment_score,
        news_count,
        vix,
        treasury_10y,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_inputs_use_documented_defaults() {
        let v = extract_features(
            &FinancialMetrics::default(),
            &SentimentSignal::default(),
            &MacroSnapshot::default(),
        );
        assert!((v.get("market_cap_log").unwrap() - 1e9_f64.ln()).abs() < 1e-12);
        assert_eq!(v.get("debt_to_equity"), Some(1.0));
        assert_eq!(v.get("current_ratio"), Some(1.0));
        assert_eq!(v.get("roe"), Some(0.1));
        assert_eq!(v.get("price_change_30d"), Some(0.0));
        assert_eq!(v.get("volatility"), Some(1.0));
        assert!((v.get("volume_avg_log").unwrap() - 1e6_f64.ln()).abs() < 1e-12);
        assert_eq!(v.get("sentiment_score"), Some(0.5));
        assert_eq!(v.get("news_count"), Some(0.0));
        assert_eq!(v.get("vix"), Some(20.0));
        assert_eq!(v.get("treasury_10y"), Some(4.0));
    }

    #[test]
    fn test_guards_clamp_extreme_values() {
        let financial = FinancialMetrics {
            market_cap: Some(-5.0),
            debt_to_equity: Some(250.0),
            current_ratio: Some(0.0),
            avg_volume: Some(0.0),
            ..Default::default()
        };
        let v = extract_features(
            &financial,
            &SentimentSignal::default(),
            &MacroSnapshot::default(),
        );
        assert!((v.get("market_cap_log").unwrap() - MIN_MARKET_CAP.ln()).abs() < 1e-12);
        assert_eq!(v.get("debt_to_equity"), Some(MAX_DEBT_TO_EQUITY));
        assert_eq!(v.get("current_ratio"), Some(MIN_CURRENT_RATIO));
        assert!((v.get("volume_avg_log").unwrap() - MIN_AVG_VOLUME.ln()).abs() < 1e-12);
        assert!(v.as_slice().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_non_finite_inputs_are_treated_as_missing() {
        let financial = FinancialMetrics {
            roe: Some(f64::NAN),
            volatility: Some(f64::INFINITY),
            ..Default::default()
        };
        let sentiment = SentimentSignal {
            sentiment_score: f64::NAN,
            news_count: 4,
            headlines: vec![],
        };
        let macro_snapshot = MacroSnapshot {
            vix: Some(f64::NEG_INFINITY),
            treasury_10y: Some(4.6),
            ..Default::default()
        };
        let v = extract_features(&financial, &sentiment, &macro_snapshot);
        assert_eq!(v.get("roe"), Some(DEFAULT_ROE));
        assert_eq!(v.get("volatility"), Some(DEFAULT_VOLATILITY));
        assert_eq!(v.get("sentiment_score"), Some(DEFAULT_SENTIMENT));
        assert_eq!(v.get("news_count"), Some(4.0));
        assert_eq!(v.get("vix"), Some(DEFAULT_VIX));
        assert_eq!(v.get("treasury_10y"), Some(4.6));
    }
}

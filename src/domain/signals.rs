use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Financial fundamentals for one entity.
///
/// Every field is optional: providers routinely omit ratios, and a failed
/// fetch yields the all-`None` record. Non-finite values are treated as
/// missing by the feature extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub price_change_30d: Option<f64>,
    #[serde(default)]
    pub volatility: Option<f64>,
    #[serde(default, alias = "volume_avg")]
    pub avg_volume: Option<f64>,
}

impl FinancialMetrics {
    /// True when the provider returned nothing usable for this entity.
    pub fn is_empty(&self) -> bool {
        [
            self.market_cap,
            self.debt_to_equity,
            self.current_ratio,
            self.roe,
            self.price_change_30d,
            self.volatility,
            self.avg_volume,
        ]
        .iter()
        .all(|v| v.map_or(true, |x| !x.is_finite()))
    }
}

/// Headline sentiment for one entity. `sentiment_score` is in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSignal {
    #[serde(default = "neutral_sentiment")]
    pub sentiment_score: f64,
    #[serde(default)]
    pub news_count: u32,
    #[serde(default)]
    pub headlines: Vec<String>,
}

fn neutral_sentiment() -> f64 {
    0.5
}

impl Default for SentimentSignal {
    fn default() -> Self {
        Self {
            sentiment_score: neutral_sentiment(),
            news_count: 0,
            headlines: Vec::new(),
        }
    }
}

impl SentimentSignal {
    pub fn has_headlines(&self) -> bool {
        !self.headlines.is_empty()
    }
}

/// Macro indicators shared by every entity in a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSnapshot {
    #[serde(default)]
    pub vix: Option<f64>,
    #[serde(default)]
    pub treasury_10y: Option<f64>,
    #[serde(default)]
    pub unemployment: Option<f64>,
    #[serde(default)]
    pub inflation: Option<f64>,
    #[serde(default)]
    pub gdp_growth: Option<f64>,
}

/// Everything one refresh cycle needs from the signal source.
#[derive(Debug, Clone, Default)]
pub struct SignalSet {
    pub financial: HashMap<String, FinancialMetrics>,
    pub sentiment: HashMap<String, SentimentSignal>,
    pub macro_snapshot: MacroSnapshot,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SignalSet {
    /// Entities that have a usable financial record, in no particular order.
    pub fn scoreable(&self) -> impl Iterator<Item = (&String, &FinancialMetrics)> {
        self.financial.iter().filter(|(_, f)| !f.is_empty())
    }

    pub fn has_financial_data(&self) -> bool {
        self.scoreable().next().is_some()
    }

    /// Sentiment for an entity, neutral when the fetch failed.
    pub fn sentiment_for(&self, entity_id: &str) -> SentimentSignal {
        self.sentiment.get(entity_id).cloned().unwrap_or_default()
    }
}

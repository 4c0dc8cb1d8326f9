use async_trait::async_trait;
use chrono::{Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use crate::domain::{FinancialMetrics, MacroSnapshot, SentimentSignal};
use crate::error::{CredintError, Result};
use crate::signals::SignalSource;

const HEADLINE_TEMPLATES: &[&str] = &[
    "{} beats quarterly earnings estimates",
    "{} announces share buyback program",
    "{} faces regulatory scrutiny",
    "Analysts downgrade {} on margin pressure",
    "{} expands into new markets",
    "{} reports supply chain disruption",
];

/// Deterministic synthetic signals.
///
/// Fundamentals are seeded from the entity id so each entity keeps a stable
/// profile; price action and sentiment are reseeded every hour so scores
/// drift between refreshes.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSignalSource {
    unavailable: HashSet<String>,
}

impl SimulatedSignalSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make financial fetches for `entity_id` fail.
    pub fn with_unavailable(mut self, entity_id: impl Into<String>) -> Self {
        self.unavailable.insert(entity_id.into());
        self
    }

    fn profile_rng(entity_id: &str) -> StdRng {
        StdRng::seed_from_u64(fnv1a(entity_id.as_bytes()))
    }

    fn hourly_rng(entity_id: &str) -> StdRng {
        let hour = (Utc::now().timestamp() / 3600) as u64;
        StdRng::seed_from_u64(fnv1a(entity_id.as_bytes()) ^ hour.rotate_left(17))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl SignalSource for SimulatedSignalSource {
    async fn fetch_financial(&self, entity_id: &str) -> Result<FinancialMetrics> {
        if self.unavailable.contains(entity_id) {
            return Err(CredintError::SignalUnavailable {
                entity: entity_id.to_string(),
                reason: "simulated outage".to_string(),
            });
        }

        let mut profile = Self::profile_rng(entity_id);
        let mut drift = Self::hourly_rng(entity_id);

        Ok(FinancialMetrics {
            market_cap: Some(10f64.powf(profile.gen_range(10.0..12.5))),
            debt_to_equity: Some(profile.gen_range(0.1..3.0)),
            current_ratio: Some(profile.gen_range(0.6..3.0)),
            roe: Some(profile.gen_range(-0.1..0.45)),
            price_change_30d: Some(drift.gen_range(-15.0..15.0)),
            volatility: Some(profile.gen_range(0.5..12.0)),
            avg_volume: Some(10f64.powf(profile.gen_range(6.0..8.0))),
        })
    }

    async fn fetch_sentiment(&self, entity_id: &str) -> Result<SentimentSignal> {
        let mut drift = Self::hourly_rng(entity_id);
        let news_count = drift.gen_range(0..=5u32);
        let headlines = (0..news_count.min(3))
            .map(|_| {
                let template = HEADLINE_TEMPLATES[drift.gen_range(0..HEADLINE_TEMPLATES.len())];
                template.replace("{}", entity_id)
            })
            .collect();

        Ok(SentimentSignal {
            sentiment_score: if news_count == 0 {
                0.5
            } else {
                drift.gen_range(0.2..0.85)
            },
            news_count,
            headlines,
        })
    }

    async fn fetch_macro(&self) -> Result<MacroSnapshot> {
        let now = Utc::now();
        Ok(MacroSnapshot {
            vix: Some(20.5 + (f64::from(now.hour()) - 12.0) * 0.5),
            treasury_10y: Some(4.2 + f64::from(now.minute()) / 60.0 * 0.2),
            unemployment: Some(3.8),
            inflation: Some(3.2),
            gdp_growth: Some(2.1),
        })
    }
}

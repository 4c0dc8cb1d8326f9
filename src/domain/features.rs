use serde::Serialize;

/// Number of model inputs
pub const FEATURE_COUNT: usize = 11;

/// Model input order. Changing it requires a retrained artifact.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "market_cap_log",
    "debt_to_equity",
    "current_ratio",
    "roe",
    "price_change_30d",
    "volatility",
    "volume_avg_log",
    "sentiment_score",
    "news_count",
    "vix",
    "treasury_10y",
];

/// Raw (unscaled) model inputs in `FEATURE_NAMES` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }
}

/// "market_cap_log" -> "Market Cap Log", "treasury_10y" -> "Treasury 10Y".
///
/// A letter is upper-cased when it starts a word or follows a non-letter;
/// every other letter is lower-cased.
pub fn display_name(feature: &str) -> String {
    let spaced = feature
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_alpha = false;
    for c in spaced.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

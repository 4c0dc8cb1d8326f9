use crate::domain::{display_name, RiskTier, SentimentSignal};

/// Contributions with |value| above this are worth mentioning
pub const SIGNIFICANCE_THRESHOLD: f64 = 10.0;
/// How many of the largest contributors are considered
const TOP_CONSIDERED: usize = 3;
/// How many factors the text names at most
const MAX_FACTORS: usize = 2;

pub const POSITIVE_SENTIMENT: f64 = 0.6;
pub const NEGATIVE_SENTIMENT: f64 = 0.4;

/// Human-readable summary of a model score.
///
/// `contributions` must be in feature order; ties in magnitude keep that order.
pub fn explain(
    entity_id: &str,
    score: f64,
    tier: RiskTier,
    contributions: &[(&str, f64)],
    sentiment: &SentimentSignal,
) -> String {
    let mut parts = vec![
        format!("{entity_id} credit score: {score:.0}/1000."),
        tier.remark().to_string(),
    ];

    let mut ranked: Vec<(&str, f64)> = contributions.to_vec();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let factors: Vec<String> = ranked
        .iter()
        .take(TOP_CONSIDERED)
        .filter(|(_, c)| c.abs() > SIGNIFICANCE_THRESHOLD)
        .take(MAX_FACTORS)
        .map(|(name, c)| {
            let impact = if *c > 0.0 { "positive" } else { "negative" };
            format!("{} ({impact})", display_name(name))
        })
        .collect();
    if !factors.is_empty() {
        parts.push(format!("Key factors: {}.", factors.join(", ")));
    }

    if sentiment.has_headlines() {
        if sentiment.sentiment_score > POSITIVE_SENTIMENT {
            parts.push("Recent news sentiment is positive.".to_string());
        } else if sentiment.sentiment_score < NEGATIVE_SENTIMENT {
            parts.push("Recent news sentiment shows concerns.".to_string());
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_headlines(score: f64) -> SentimentSignal {
        SentimentSignal {
            sentiment_score: score,
            news_count: 2,
            headlines: vec!["Beats estimates".to_string(), "Raises guidance".to_string()],
        }
    }

    #[test]
    fn test_names_two_largest_significant_factors() {
        let contributions = [
            ("market_cap_log", 4.0),
            ("roe", 35.5),
            ("volatility", -22.0),
            ("vix", -18.0),
        ];
        let text = explain(
            "ACME",
            812.4,
            RiskTier::Low,
            &contributions,
            &SentimentSignal::default(),
        );
        assert_eq!(
            text,
            "ACME credit score: 812/1000. Strong creditworthiness. \
             Key factors: Roe (positive), Volatility (negative)."
        );
    }

    #[test]
    fn test_insignificant_factors_are_omitted() {
        let contributions = [("roe", 9.9), ("vix", -10.0)];
        let text = explain(
            "ACME",
            610.0,
            RiskTier::Medium,
            &contributions,
            &SentimentSignal::default(),
        );
        assert_eq!(text, "ACME credit score: 610/1000. Moderate credit risk.");
    }

    #[test]
    fn test_at_most_two_factors_are_named() {
        let contributions = [("a_b", 50.0), ("c", -45.0), ("d", 40.0), ("e", 3.0)];
        let text = explain("X", 300.0, RiskTier::High, &contributions, &SentimentSignal::default());
        assert!(text.ends_with("Higher credit risk concerns. Key factors: A B (positive), C (negative)."));
    }

    #[test]
    fn test_sentiment_remark_requires_headlines() {
        let none = explain("X", 500.0, RiskTier::Medium, &[], &SentimentSignal {
            sentiment_score: 0.9,
            news_count: 0,
            headlines: vec![],
        });
        assert!(!none.contains("sentiment"));

        let positive = explain("X", 500.0, RiskTier::Medium, &[], &with_headlines(0.8));
        assert!(positive.ends_with("Recent news sentiment is positive."));

        let negative = explain("X", 500.0, RiskTier::Medium, &[], &with_headlines(0.2));
        assert!(negative.ends_with("Recent news sentiment shows concerns."));

        let neutral = explain("X", 500.0, RiskTier::Medium, &[], &with_headlines(0.5));
        assert!(!neutral.contains("sentiment"));
    }
}

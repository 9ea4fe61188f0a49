//! Rule-based query intent classification.
//!
//! First-match-wins over a fixed priority list of keyword sets. The order is
//! deliberate: a query containing both "compare" and "trend" keywords
//! classifies as a comparison.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Compare,
    Trend,
    Rate,
    Sales,
    Overview,
}

const KEYWORD_PRIORITY: &[(Intent, &[&str])] = &[
    (Intent::Compare, &["compare", "comparison", "vs", "versus", "between"]),
    (Intent::Trend, &["trend", "growth", "over time", "yearly", "year"]),
    (Intent::Rate, &["rate", "price", "cost", "average rate"]),
    (Intent::Sales, &["sales", "sold", "transaction"]),
];

impl Intent {
    /// Classify a free-text query. Pure; defaults to `Overview` when no
    /// keyword matches.
    pub fn classify(query: &str) -> Intent {
        let query_lower = query.to_lowercase();
        for (intent, keywords) in KEYWORD_PRIORITY {
            if keywords.iter().any(|kw| query_lower.contains(kw)) {
                return *intent;
            }
        }
        Intent::Overview
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Compare => "compare",
            Intent::Trend => "trend",
            Intent::Rate => "rate",
            Intent::Sales => "sales",
            Intent::Overview => "overview",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_category() {
        assert_eq!(Intent::classify("compare Wakad vs Baner"), Intent::Compare);
        assert_eq!(Intent::classify("sales trend in Wakad"), Intent::Trend);
        assert_eq!(Intent::classify("what is the flat price"), Intent::Rate);
        assert_eq!(Intent::classify("how many flats sold"), Intent::Sales);
        assert_eq!(Intent::classify("tell me about Wakad"), Intent::Overview);
    }

    #[test]
    fn test_compare_wins_over_trend() {
        // Both keyword sets hit; priority order decides.
        assert_eq!(
            Intent::classify("compare the yearly trend of Wakad and Baner"),
            Intent::Compare
        );
    }

    #[test]
    fn test_trend_wins_over_rate() {
        assert_eq!(
            Intent::classify("rate growth in Wakad"),
            Intent::Trend
        );
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(Intent::classify("COMPARE Wakad VERSUS Baner"), Intent::Compare);
    }
}

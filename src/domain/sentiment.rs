// ============================================================
// Layer 3 — Sentiment Labels
// ============================================================
// Two label types live here:
//
//   RawLabel  — what the CSV files contain, including the
//               `Irrelevant` class that the pipeline drops
//   Sentiment — the three classes the models predict
//
// Numeric mapping used by every model and metric:
//
//   Negative → 0
//   Neutral  → 1
//   Positive → 2

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of classes the classifiers output.
pub const NUM_CLASSES: usize = 3;

/// A label as it appears in the raw data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawLabel {
    Positive,
    Neutral,
    Negative,
    Irrelevant,
}

impl RawLabel {
    /// Irrelevant rows have no sentiment and map to None.
    pub fn sentiment(self) -> Option<Sentiment> {
        match self {
            RawLabel::Positive   => Some(Sentiment::Positive),
            RawLabel::Neutral    => Some(Sentiment::Neutral),
            RawLabel::Negative   => Some(Sentiment::Negative),
            RawLabel::Irrelevant => None,
        }
    }
}

impl FromStr for RawLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive"   => Ok(RawLabel::Positive),
            "neutral"    => Ok(RawLabel::Neutral),
            "negative"   => Ok(RawLabel::Negative),
            "irrelevant" => Ok(RawLabel::Irrelevant),
            _            => Err(s.to_string()),
        }
    }
}

/// One of the three predicted sentiment classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// All classes in numeric-label order.
    pub const ALL: [Sentiment; NUM_CLASSES] =
        [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];

    /// The numeric label the models are trained against.
    pub fn index(self) -> usize {
        match self {
            Sentiment::Negative => 0,
            Sentiment::Neutral  => 1,
            Sentiment::Positive => 2,
        }
    }

    /// Inverse of `index`. Returns None for anything outside 0..3.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Negative => "Negative",
            Sentiment::Neutral  => "Neutral",
            Sentiment::Positive => "Positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RawLabel::from_str(s)?
            .sentiment()
            .ok_or_else(|| s.to_string())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_maps_to_two_and_back() {
        let s: Sentiment = "Positive".parse().unwrap();
        assert_eq!(s.index(), 2);
        assert_eq!(Sentiment::from_index(2).unwrap().to_string(), "Positive");
    }

    #[test]
    fn test_mapping_is_a_bijection() {
        let mut seen = std::collections::HashSet::new();
        for s in Sentiment::ALL {
            assert!(seen.insert(s.index()), "duplicate index for {s}");
            assert_eq!(Sentiment::from_index(s.index()), Some(s));
            assert_eq!(s.as_str().parse::<Sentiment>(), Ok(s));
        }
        assert_eq!(seen.len(), NUM_CLASSES);
        assert_eq!(Sentiment::from_index(NUM_CLASSES), None);
    }

    #[test]
    fn test_irrelevant_has_no_sentiment() {
        let raw: RawLabel = "Irrelevant".parse().unwrap();
        assert_eq!(raw.sentiment(), None);
        assert!("Irrelevant".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_label_parsing_ignores_case_and_padding() {
        assert_eq!(" negative ".parse::<RawLabel>(), Ok(RawLabel::Negative));
        assert!("Mixed".parse::<RawLabel>().is_err());
    }
}

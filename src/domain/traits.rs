// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits so
// the CSV loader and the two model architectures can be
// swapped or faked in tests.

use anyhow::Result;

use crate::domain::record::RawRecord;
use crate::domain::sentiment::{Sentiment, NUM_CLASSES};

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled tweets.
///
/// Implementations:
///   - CsvLoader → reads a `text,label` CSV file
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<RawRecord>>;
}

// ─── Prediction ───────────────────────────────────────────────────────────────
/// The outcome of classifying one piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub sentiment:     Sentiment,
    /// Softmax probabilities indexed by `Sentiment::index`.
    pub probabilities: [f32; NUM_CLASSES],
}

impl Prediction {
    /// Pick the argmax class. Ties resolve to the lower index.
    pub fn from_probabilities(probabilities: [f32; NUM_CLASSES]) -> Self {
        let mut best = 0;
        for (i, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = i;
            }
        }
        let sentiment = Sentiment::from_index(best).unwrap_or(Sentiment::Neutral);
        Self { sentiment, probabilities }
    }

    pub fn confidence(&self) -> f32 {
        self.probabilities[self.sentiment.index()]
    }
}

// ─── SentimentClassifier ──────────────────────────────────────────────────────
/// Any component that can label raw, uncleaned text.
///
/// Implementations:
///   - Inferencer → a trained dense or LSTM checkpoint
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Prediction>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_takes_argmax() {
        let p = Prediction::from_probabilities([0.1, 0.2, 0.7]);
        assert_eq!(p.sentiment, Sentiment::Positive);
        assert!((p.confidence() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_ties_resolve_low() {
        let p = Prediction::from_probabilities([0.4, 0.4, 0.2]);
        assert_eq!(p.sentiment, Sentiment::Negative);
    }
}

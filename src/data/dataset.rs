use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::sequencer::EncodedSequence;
use crate::data::tfidf::SparseVector;

/// One TF-IDF row and its numeric label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfSample {
    pub features: SparseVector,
    pub label:    usize,
}

/// One padded index sequence and its numeric label.
/// `length` counts the real tokens before the padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSample {
    pub token_ids: Vec<u32>,
    pub length:    usize,
    pub label:     usize,
}

impl SequenceSample {
    pub fn new(encoded: EncodedSequence, label: usize) -> Self {
        Self { token_ids: encoded.ids, length: encoded.length, label }
    }
}

/// In-memory dataset over either sample type.
pub struct SentimentDataset<T> {
    samples: Vec<T>,
}

impl<T> SentimentDataset<T> {
    pub fn new(samples: Vec<T>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl<T: Clone + Send + Sync> Dataset<T> for SentimentDataset<T> {
    fn get(&self, index: usize) -> Option<T> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_get_and_len() {
        let ds = SentimentDataset::new(vec![
            SequenceSample { token_ids: vec![2, 0], length: 1, label: 2 },
            SequenceSample { token_ids: vec![3, 4], length: 2, label: 0 },
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().label, 0);
        assert!(ds.get(2).is_none());
    }
}

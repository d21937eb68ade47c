// ============================================================
// Layer 4 — Batchers
// ============================================================
// Implements Burn's Batcher trait for both feature types.
//
//   TfidfBatcher     Vec<TfidfSample>    → features [N, vocab]
//   SequenceBatcher  Vec<SequenceSample> → tokens   [N, max_len]
//                                          lengths  [N]
//
// Both also emit the numeric labels as targets [N].
// TF-IDF rows are sparse until this point; only one batch is
// ever densified at a time.
//
// The tensor helpers are shared with the inferencer so
// training and prediction build inputs the same way.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::{SequenceSample, TfidfSample};
use crate::data::tfidf::SparseVector;

// ─── Shared tensor helpers ────────────────────────────────────────────────────

/// Densify sparse rows into a `[rows, dim]` float tensor.
pub fn tfidf_tensor<'a, B: Backend>(
    rows:   impl ExactSizeIterator<Item = &'a SparseVector>,
    dim:    usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    let n = rows.len();
    let mut flat = vec![0.0f32; n * dim];
    for (i, row) in rows.enumerate() {
        row.scatter_into(&mut flat[i * dim..(i + 1) * dim]);
    }
    Tensor::from_data(TensorData::new(flat, [n, dim]), device)
}

/// Stack equal-length id sequences into a `[rows, seq_len]` int tensor.
pub fn token_tensor<'a, B: Backend>(
    rows:    impl ExactSizeIterator<Item = &'a [u32]>,
    seq_len: usize,
    device:  &B::Device,
) -> Tensor<B, 2, Int> {
    let n = rows.len();
    let flat: Vec<i64> = rows.flat_map(|r| r.iter().map(|&id| id as i64)).collect();
    Tensor::from_data(TensorData::new(flat, [n, seq_len]), device)
}

/// 1-D int tensor from a list of counts or labels.
pub fn index_tensor<B: Backend>(values: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let flat: Vec<i64> = values.iter().map(|&v| v as i64).collect();
    Tensor::from_data(TensorData::new(flat, [values.len()]), device)
}

// ─── LabelledBatch ────────────────────────────────────────────────────────────
/// Anything the training loop can score against gold labels.
pub trait LabelledBatch<B: Backend> {
    fn targets(&self) -> Tensor<B, 1, Int>;
}

// ─── TF-IDF batches ───────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TfidfBatch<B: Backend> {
    /// [batch_size, vocab]
    pub features: Tensor<B, 2>,
    /// [batch_size]
    pub targets:  Tensor<B, 1, Int>,
}

impl<B: Backend> LabelledBatch<B> for TfidfBatch<B> {
    fn targets(&self) -> Tensor<B, 1, Int> {
        self.targets.clone()
    }
}

#[derive(Clone, Debug)]
pub struct TfidfBatcher<B: Backend> {
    pub device: B::Device,
    /// Number of TF-IDF columns
    pub dim:    usize,
}

impl<B: Backend> TfidfBatcher<B> {
    pub fn new(device: B::Device, dim: usize) -> Self {
        Self { device, dim }
    }
}

impl<B: Backend> Batcher<TfidfSample, TfidfBatch<B>> for TfidfBatcher<B> {
    fn batch(&self, items: Vec<TfidfSample>) -> TfidfBatch<B> {
        let labels: Vec<usize> = items.iter().map(|s| s.label).collect();
        let features = tfidf_tensor(items.iter().map(|s| &s.features), self.dim, &self.device);
        let targets  = index_tensor(&labels, &self.device);
        TfidfBatch { features, targets }
    }
}

// ─── Sequence batches ─────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// [batch_size, max_len]
    pub tokens:  Tensor<B, 2, Int>,
    /// Unpadded length per row, [batch_size]
    pub lengths: Tensor<B, 1, Int>,
    /// [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> LabelledBatch<B> for SequenceBatch<B> {
    fn targets(&self) -> Tensor<B, 1, Int> {
        self.targets.clone()
    }
}

#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SequenceSample, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<SequenceSample>) -> SequenceBatch<B> {
        // All sequences share the padded length
        let seq_len = items.first().map_or(0, |s| s.token_ids.len());

        let lengths: Vec<usize> = items.iter().map(|s| s.length).collect();
        let labels:  Vec<usize> = items.iter().map(|s| s.label).collect();

        let tokens = token_tensor(
            items.iter().map(|s| s.token_ids.as_slice()),
            seq_len,
            &self.device,
        );

        SequenceBatch {
            tokens,
            lengths: index_tensor(&lengths, &self.device),
            targets: index_tensor(&labels, &self.device),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_tfidf_batch_is_dense() {
        let device = Default::default();
        let batcher = TfidfBatcher::<TestBackend>::new(device, 4);
        let items = vec![
            TfidfSample {
                features: SparseVector { indices: vec![1, 3], values: vec![0.6, 0.8] },
                label:    2,
            },
            TfidfSample { features: SparseVector::default(), label: 0 },
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.features.dims(), [2, 4]);
        let values: Vec<f32> = batch.features.into_data().to_vec().unwrap();
        assert_eq!(values, vec![0.0, 0.6, 0.0, 0.8, 0.0, 0.0, 0.0, 0.0]);
        let targets: Vec<i64> = batch.targets.into_data().iter::<i64>().collect();
        assert_eq!(targets, vec![2, 0]);
    }

    #[test]
    fn test_sequence_batch_shapes() {
        let device = Default::default();
        let batcher = SequenceBatcher::<TestBackend>::new(device);
        let items = vec![
            SequenceSample { token_ids: vec![2, 3, 0, 0, 0], length: 2, label: 1 },
            SequenceSample { token_ids: vec![4, 1, 5, 6, 7], length: 5, label: 0 },
            SequenceSample { token_ids: vec![0, 0, 0, 0, 0], length: 0, label: 2 },
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.tokens.dims(), [3, 5]);
        assert_eq!(batch.lengths.dims(), [3]);
        let lengths: Vec<i64> = batch.lengths.into_data().iter::<i64>().collect();
        assert_eq!(lengths, vec![2, 5, 0]);
        let tokens: Vec<i64> = batch.tokens.into_data().iter::<i64>().collect();
        assert_eq!(&tokens[5..10], &[4, 1, 5, 6, 7]);
    }
}

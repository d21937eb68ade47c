// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the checkpoint directory:
//
//   checkpoint.rs   — Model weights via Burn's CompactRecorder,
//                     plus train_config.json so inference can
//                     rebuild the architecture.
//
//   vocab_store.rs  — The fitted TF-IDF vocabulary or the
//                     sequence tokenizer, so inference uses the
//                     same feature columns / indices as training.
//
//   metrics.rs      — Epoch-level loss and accuracy written to
//                     metrics.csv for plotting learning curves.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vectorizer vocabulary persistence
pub mod vocab_store;

/// Training metrics CSV logger
pub mod metrics;

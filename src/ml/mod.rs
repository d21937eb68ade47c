// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// The neural side of the pipeline.
//
//   model.rs      — DenseClassifier (TF-IDF → 3 ReLU layers → 3)
//                   LstmClassifier  (frozen embeddings → LSTM → 3)
//                   and the SentimentModel trait both implement
//
//   trainer.rs    — Adam + cross-entropy loop with validation,
//                   early stopping and best-only checkpointing
//
//   evaluator.rs  — Accuracy, per-class precision/recall/F1,
//                   averages and the confusion matrix
//
//   inferencer.rs — Rebuilds a model from its checkpoint and
//                   returns class probabilities for new text

/// Dense and LSTM classifier architectures
pub mod model;

/// Training loop with early stopping
pub mod trainer;

/// Classification metrics
pub mod evaluator;

/// Inference engine — loads checkpoint and predicts sentiment
pub mod inferencer;

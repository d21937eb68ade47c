// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal each.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No argument parsing here (that's Layer 1)
//   - No direct file formats (that's Layer 4 and 6)
//   - Only workflow coordination

// CSV → vectorizer → trained checkpoint
pub mod train_use_case;

// Checkpoint + labelled CSV → classification report
pub mod evaluate_use_case;

// Checkpoint + stdin → interactive predictions
pub mod predict_use_case;

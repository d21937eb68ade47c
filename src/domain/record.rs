// ============================================================
// Layer 3 — Tweet Records
// ============================================================
// RawRecord is one labelled row as loaded from disk.
// CleanRecord carries the normalised text the vectorizers see.
// Irrelevant rows never become CleanRecords, so every
// CleanRecord has a defined numeric label.

use serde::{Deserialize, Serialize};

use crate::domain::sentiment::{RawLabel, Sentiment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub text:  String,
    pub label: RawLabel,
}

impl RawRecord {
    pub fn new(text: impl Into<String>, label: RawLabel) -> Self {
        Self { text: text.into(), label }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub text:       String,
    pub clean_text: String,
    pub sentiment:  Sentiment,
}

impl CleanRecord {
    /// Numeric training target (0, 1 or 2).
    pub fn target(&self) -> usize {
        self.sentiment.index()
    }
}

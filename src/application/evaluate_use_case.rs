// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a saved checkpoint against a labelled CSV:
//
//   Step 1: Reload model + vocabulary     (Layer 5 - ml)
//   Step 2: Load and clean the test CSV   (Layer 4 - data)
//   Step 3: Predict every tweet           (Layer 5 - ml)
//   Step 4: Build the report              (Layer 5 - ml)

use anyhow::{ensure, Result};
use std::path::PathBuf;

use crate::application::train_use_case::load_clean;
use crate::data::preprocessor::TextCleaner;
use crate::ml::{evaluator::ClassificationReport, inferencer::Inferencer};

pub struct EvaluateUseCase {
    checkpoint_dir: PathBuf,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into() }
    }

    pub fn execute(&self, test_csv: &str) -> Result<ClassificationReport> {
        let inferencer = Inferencer::from_checkpoint(&self.checkpoint_dir)?;

        let records = load_clean(test_csv, &TextCleaner::new())?;
        ensure!(!records.is_empty(), "no labelled records to evaluate in '{}'", test_csv);

        let texts: Vec<&str> = records.iter().map(|r| r.clean_text.as_str()).collect();
        let predicted: Vec<usize> = inferencer
            .predict_clean(&texts)?
            .iter()
            .map(|p| p.sentiment.index())
            .collect();
        let gold: Vec<usize> = records.iter().map(|r| r.target()).collect();

        let report = ClassificationReport::from_predictions(&gold, &predicted);
        tracing::info!(
            "Evaluated {} {} predictions: accuracy={:.4}, macro F1={:.4}",
            report.total,
            inferencer.architecture(),
            report.accuracy,
            report.macro_avg.f1
        );
        Ok(report)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = tmp.path().join("test.csv");
        std::fs::write(&csv, "text,label\nhello,Positive\n").unwrap();

        let err = EvaluateUseCase::new(tmp.path().join("nope"))
            .execute(&csv.display().to_string())
            .unwrap_err();
        assert!(err.to_string().contains("train"));
    }
}

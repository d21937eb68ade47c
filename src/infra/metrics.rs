// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average cross-entropy loss on training set
//   - val_loss:   average cross-entropy loss on validation set
//   - train_acc:  fraction of training tweets labelled correctly
//   - val_acc:    fraction of validation tweets labelled correctly
//
// Output file: checkpoints/metrics.csv
//
//   epoch,train_loss,val_loss,train_acc,val_acc
//   1,1.0712,1.0398,0.4310,0.4822
//   2,0.9127,0.9541,0.5804,0.5530
//   ...
//
// A new training run starts a fresh file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

const METRICS_FILE: &str = "metrics.csv";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy loss over all training batches
    pub train_loss: f64,

    /// Average cross-entropy loss on the validation set.
    /// Should track train_loss; divergence indicates overfitting
    pub val_loss: f64,

    /// Range: [0.0, 1.0]
    pub train_acc: f64,

    /// Range: [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:      usize,
        train_loss: f64,
        val_loss:   f64,
        train_acc:  f64,
        val_acc:    f64,
    ) -> Self {
        Self { epoch, train_loss, val_loss, train_acc, val_acc }
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create (or truncate) `metrics.csv` in `dir` and write the header.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let csv_path = dir.join(METRICS_FILE);
        let mut writer = csv::Writer::from_path(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writer.write_record(["epoch", "train_loss", "val_loss", "train_acc", "val_acc"])?;
        writer.flush()?;

        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.serialize(m)?;
        writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );
        Ok(())
    }

    /// Read every row logged so far.
    #[cfg(test)]
    pub fn read_all(&self) -> Result<Vec<EpochMetrics>> {
        let mut reader = csv::Reader::from_path(&self.csv_path)?;
        let rows = reader.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    #[cfg(test)]
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_appended_after_header() {
        let tmp    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::create(tmp.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.0, 1.1, 0.4, 0.35)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.8, 0.9, 0.6, 0.5)).unwrap();

        let rows = logger.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], EpochMetrics::new(2, 0.8, 0.9, 0.6, 0.5));

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert!(text.starts_with("epoch,train_loss,val_loss,train_acc,val_acc\n"));
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let tmp = tempfile::tempdir().unwrap();
        let first = MetricsLogger::create(tmp.path()).unwrap();
        first.log(&EpochMetrics::new(1, 1.0, 1.0, 0.3, 0.3)).unwrap();

        let second = MetricsLogger::create(tmp.path()).unwrap();
        assert!(second.read_all().unwrap().is_empty());
    }
}

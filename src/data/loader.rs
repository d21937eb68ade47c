// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Loads labelled tweets from a CSV file with a header row:
//
//   text,label
//   "I love this phone",Positive
//   "meh",Neutral
//
// Extra columns are ignored. An empty text cell becomes the
// empty string. Any label outside Positive / Neutral /
// Negative / Irrelevant fails the whole load, as does a
// missing file or a row the CSV parser cannot read.

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::record::RawRecord;
use crate::domain::sentiment::RawLabel;
use crate::domain::traits::RecordSource;
use crate::error::PipelineError;

/// Column layout expected in every data file.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    text:  Option<String>,
    label: String,
}

/// Reads one CSV file. Implements RecordSource.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> crate::error::Result<Vec<RawRecord>> {
        let csv_err = |source| PipelineError::Csv { path: self.path.clone(), source };

        if !self.path.exists() {
            return Err(PipelineError::Io {
                path:   self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(&self.path)
            .map_err(csv_err)?;

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(csv_err)?;
            let label = row.label.parse::<RawLabel>().map_err(|label| {
                PipelineError::UnknownLabel { path: self.path.clone(), row: i + 1, label }
            })?;
            records.push(RawRecord::new(row.text.unwrap_or_default(), label));
        }
        Ok(records)
    }
}

impl RecordSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<RawRecord>> {
        let records = self.read()?;
        tracing::info!(
            "Loaded {} records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}

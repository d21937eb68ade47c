// ============================================================
// Typed pipeline errors
// ============================================================
// Data-layer failures that callers may want to tell apart.
// The application and CLI layers wrap these in anyhow with
// extra context (file paths, which step failed).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read '{path}'")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV '{path}'")]
    Csv {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unknown label '{label}' in '{path}' at row {row}")]
    UnknownLabel {
        path:  PathBuf,
        row:   usize,
        label: String,
    },

    #[error("cannot fit {0} on an empty corpus")]
    EmptyCorpus(&'static str),

    #[error("embedding file '{path}': {reason}")]
    Embedding {
        path:   PathBuf,
        reason: String,
    },

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn embedding(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PipelineError::Embedding { path: path.into(), reason: reason.into() }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_cause_is_reported_once() {
        let err = PipelineError::Io {
            path:   PathBuf::from("data/missing.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain, "cannot read 'data/missing.csv': no such file");
    }
}

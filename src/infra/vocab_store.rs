// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists whichever vocabulary the run fitted so inference
// vectorizes text exactly like training did.
//
//   dense model → tfidf_vocab.json  (terms, idf weights, n-gram range)
//   lstm model  → tokenizer.json    (HuggingFace WordLevel tokenizer)
//
// The sequence length is not part of tokenizer.json; it comes
// from train_config.json when the encoder is rebuilt.

use anyhow::{Context, Result};
use std::{
    fs,
    path::PathBuf,
};
use tokenizers::Tokenizer;

use crate::data::{sequencer::SequenceEncoder, tfidf::TfidfVectorizer};

const TFIDF_FILE:     &str = "tfidf_vocab.json";
const TOKENIZER_FILE: &str = "tokenizer.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save_tfidf(&self, vectorizer: &TfidfVectorizer) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(TFIDF_FILE);
        fs::write(&path, serde_json::to_string(vectorizer)?)
            .with_context(|| format!("Cannot write TF-IDF vocabulary '{}'", path.display()))?;

        tracing::info!("TF-IDF vocabulary ({} terms) saved to '{}'", vectorizer.dim(), path.display());
        Ok(())
    }

    pub fn load_tfidf(&self) -> Result<TfidfVectorizer> {
        let path = self.dir.join(TFIDF_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!("Cannot read '{}'. Have you trained a dense model first?", path.display())
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed TF-IDF vocabulary '{}'", path.display()))
    }

    pub fn save_tokenizer(&self, encoder: &SequenceEncoder) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(TOKENIZER_FILE);
        encoder
            .tokenizer()
            .save(&path, true)
            .map_err(|e| anyhow::anyhow!("Cannot write tokenizer '{}': {e}", path.display()))?;

        tracing::info!(
            "Tokenizer ({} entries) saved to '{}'",
            encoder.vocab_size(),
            path.display()
        );
        Ok(())
    }

    /// Load `tokenizer.json` and wrap it with the training-time `max_len`.
    pub fn load_sequence_encoder(&self, max_len: usize) -> Result<SequenceEncoder> {
        let path = self.dir.join(TOKENIZER_FILE);
        let tokenizer = Tokenizer::from_file(&path).map_err(|e| {
            anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {e}. Have you trained an LSTM model first?",
                path.display()
            )
        })?;
        Ok(SequenceEncoder::from_tokenizer(tokenizer, max_len))
    }
}

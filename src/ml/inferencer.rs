// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds a trained model from the checkpoint directory and
// labels new text with it.
//
//   train_config.json → which architecture + its Config
//   model.mpk         → weights
//   tfidf_vocab.json  → dense feature columns      (dense)
//   tokenizer.json    → sequence indices           (lstm)
//
// Text goes through the same TextCleaner and vectorizer the
// training run used, then one forward pass and a softmax.

use anyhow::Result;
use burn::{prelude::*, tensor::activation::softmax};
use std::path::Path;

use crate::data::{
    batcher::{index_tensor, tfidf_tensor, token_tensor},
    preprocessor::TextCleaner,
    sequencer::SequenceEncoder,
    tfidf::TfidfVectorizer,
};
use crate::domain::{
    sentiment::NUM_CLASSES,
    traits::{Prediction, SentimentClassifier},
};
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabStore};
use crate::ml::model::{DenseClassifier, LstmClassifier, ModelSpec};

#[cfg(not(feature = "wgpu"))]
pub type InferBackend = burn::backend::NdArray;
#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

type InferDevice = <InferBackend as Backend>::Device;

/// Texts per forward pass when labelling many at once.
const PREDICT_BATCH: usize = 256;

enum Classifier {
    Dense {
        model:      DenseClassifier<InferBackend>,
        vectorizer: TfidfVectorizer,
    },
    Lstm {
        model:   LstmClassifier<InferBackend>,
        encoder: SequenceEncoder,
    },
}

pub struct Inferencer {
    classifier: Classifier,
    cleaner:    TextCleaner,
    device:     InferDevice,
}

impl Inferencer {
    pub fn from_checkpoint(dir: impl AsRef<Path>) -> Result<Self> {
        let dir    = dir.as_ref();
        let device = InferDevice::default();
        let ckpt   = CheckpointManager::open(dir);
        let vocab  = VocabStore::new(dir);
        let run    = ckpt.load_config()?;

        let classifier = match run.model {
            ModelSpec::Dense(cfg) => {
                let vectorizer = vocab.load_tfidf()?;
                anyhow::ensure!(
                    vectorizer.dim() == cfg.input_dim,
                    "TF-IDF vocabulary has {} columns but the model expects {}",
                    vectorizer.dim(),
                    cfg.input_dim
                );
                let model = ckpt.load_model::<InferBackend, _>(cfg.init(&device), &device)?;
                Classifier::Dense { model, vectorizer }
            }
            ModelSpec::Lstm(cfg) => {
                let encoder = vocab.load_sequence_encoder(run.train.max_len)?;
                anyhow::ensure!(
                    encoder.vocab_size() == cfg.vocab_size,
                    "tokenizer has {} entries but the model expects {}",
                    encoder.vocab_size(),
                    cfg.vocab_size
                );
                let model   = ckpt.load_model::<InferBackend, _>(cfg.init(&device), &device)?;
                Classifier::Lstm { model, encoder }
            }
        };

        tracing::info!("Model loaded from checkpoint '{}'", dir.display());
        Ok(Self { classifier, cleaner: TextCleaner::new(), device })
    }

    pub fn architecture(&self) -> &'static str {
        match self.classifier {
            Classifier::Dense { .. } => "dense",
            Classifier::Lstm { .. }  => "lstm",
        }
    }

    /// Label already-cleaned documents, `PREDICT_BATCH` at a time.
    pub fn predict_clean<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<Prediction>> {
        let mut out = Vec::with_capacity(docs.len());
        for chunk in docs.chunks(PREDICT_BATCH) {
            let probs = self.probabilities(chunk)?;
            out.extend(
                probs
                    .chunks_exact(NUM_CLASSES)
                    .map(|row| Prediction::from_probabilities([row[0], row[1], row[2]])),
            );
        }
        Ok(out)
    }

    /// Softmax over the logits, flattened row-major `[docs, NUM_CLASSES]`.
    fn probabilities<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<f32>> {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let logits = match &self.classifier {
            Classifier::Dense { model, vectorizer } => {
                let rows = vectorizer.transform(docs);
                let features = tfidf_tensor::<InferBackend>(rows.iter(), vectorizer.dim(), &self.device);
                model.forward(features)
            }
            Classifier::Lstm { model, encoder } => {
                let encoded = encoder.encode_all(docs)?;
                let lengths: Vec<usize> = encoded.iter().map(|e| e.length).collect();
                let tokens = token_tensor::<InferBackend>(
                    encoded.iter().map(|e| e.ids.as_slice()),
                    encoder.max_len(),
                    &self.device,
                );
                model.forward(tokens, index_tensor(&lengths, &self.device))
            }
        };

        softmax(logits, 1)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read model output: {e:?}"))
    }
}

impl SentimentClassifier for Inferencer {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let clean = self.cleaner.clean(text);
        tracing::debug!("Cleaned input: '{}'", clean);
        self.predict_clean(&[clean])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("model returned no prediction"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{Architecture, TrainConfig};
    use crate::infra::checkpoint::RunConfig;
    use crate::ml::model::{DenseClassifierConfig, LstmClassifierConfig};
    use crate::domain::sentiment::Sentiment;

    const DOCS: [&str; 4] = ["love new phone", "hate rain", "game tonight", "love game"];

    fn assert_distribution(p: &Prediction) {
        let sum: f32 = p.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(p.probabilities.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }

    #[test]
    fn test_dense_checkpoint_reloads_and_predicts() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = InferDevice::default();

        let mut vectorizer = TfidfVectorizer::new(100);
        vectorizer.fit(&DOCS).unwrap();
        VocabStore::new(tmp.path()).save_tfidf(&vectorizer).unwrap();

        let cfg  = DenseClassifierConfig::new(vectorizer.dim()).with_hidden_size(8);
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        ckpt.save_model::<InferBackend, _>(&cfg.init::<InferBackend>(&device)).unwrap();
        ckpt.save_config(&RunConfig { train: TrainConfig::default(), model: ModelSpec::Dense(cfg) })
            .unwrap();

        let inferencer = Inferencer::from_checkpoint(tmp.path()).unwrap();
        assert_eq!(inferencer.architecture(), "dense");

        let p = inferencer.classify("I LOVE my new phone!! http://x.com").unwrap();
        assert_distribution(&p);
        assert!(Sentiment::ALL.contains(&p.sentiment));

        let many = inferencer.predict_clean(&["love", "", "unseen words only"]).unwrap();
        assert_eq!(many.len(), 3);
    }

    #[test]
    fn test_lstm_checkpoint_reloads_and_predicts() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = InferDevice::default();

        let encoder = SequenceEncoder::fit(&DOCS, 6, None).unwrap();
        VocabStore::new(tmp.path()).save_tokenizer(&encoder).unwrap();

        let cfg  = LstmClassifierConfig::new(encoder.vocab_size(), 4).with_hidden_size(5);
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        ckpt.save_model::<InferBackend, _>(&cfg.init::<InferBackend>(&device)).unwrap();
        let train = TrainConfig { arch: Architecture::Lstm, max_len: 6, ..TrainConfig::default() };
        ckpt.save_config(&RunConfig { train, model: ModelSpec::Lstm(cfg) }).unwrap();

        let inferencer = Inferencer::from_checkpoint(tmp.path()).unwrap();
        assert_eq!(inferencer.architecture(), "lstm");

        let predictions = inferencer.predict_clean(&DOCS).unwrap();
        assert_eq!(predictions.len(), DOCS.len());
        predictions.iter().for_each(assert_distribution);
    }

    #[test]
    fn test_tokenizer_from_another_run_is_rejected() {
        let tmp    = tempfile::tempdir().unwrap();
        let device = InferDevice::default();

        let small = SequenceEncoder::fit(&DOCS[..1], 6, None).unwrap();
        let cfg   = LstmClassifierConfig::new(small.vocab_size(), 4).with_hidden_size(5);
        let ckpt  = CheckpointManager::new(tmp.path()).unwrap();
        ckpt.save_model::<InferBackend, _>(&cfg.init::<InferBackend>(&device)).unwrap();
        let train = TrainConfig { arch: Architecture::Lstm, max_len: 6, ..TrainConfig::default() };
        ckpt.save_config(&RunConfig { train, model: ModelSpec::Lstm(cfg) }).unwrap();

        let large = SequenceEncoder::fit(&DOCS, 6, None).unwrap();
        assert!(large.vocab_size() > small.vocab_size());
        VocabStore::new(tmp.path()).save_tokenizer(&large).unwrap();

        let err = Inferencer::from_checkpoint(tmp.path()).err().unwrap();
        assert!(err.to_string().contains("tokenizer"));
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(Inferencer::from_checkpoint(tmp.path()).is_err());
    }
}

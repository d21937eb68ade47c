// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the training CSV         (Layer 4 - data)
//   Step 2: Clean the text                (Layer 4 - data)
//   Step 3: Validation CSV or 80/20 split (Layer 4 - data)
//   Step 4: Fit the vectorizer            (Layer 4 - data)
//           dense → TF-IDF, lstm → sequence vocabulary + embeddings
//   Step 5: Build datasets                (Layer 4 - data)
//   Step 6: Save config + vocabulary      (Layer 6 - infra)
//   Step 7: Run training loop             (Layer 5 - ml)
//   Step 8: Evaluate on the test CSV      (Layer 2 - evaluate)
//
// Vectorizers only ever see the training split.
// The previous run's weights are deleted before anything new is
// written, and every input (embeddings included) is read before
// the vocabulary is saved. A failed run therefore leaves either
// the old checkpoint untouched or no loadable model at all.

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::application::evaluate_use_case::EvaluateUseCase;
use crate::data::{
    batcher::{SequenceBatcher, TfidfBatcher},
    dataset::{SentimentDataset, SequenceSample, TfidfSample},
    embeddings::{EmbeddingFormat, EmbeddingLoader},
    loader::CsvLoader,
    preprocessor::TextCleaner,
    sequencer::{SequenceEncoder, DEFAULT_MAX_LEN},
    splitter::split_train_val,
    tfidf::{TfidfVectorizer, DEFAULT_MAX_FEATURES},
};
use crate::domain::{
    record::CleanRecord,
    sentiment::{Sentiment, NUM_CLASSES},
    traits::RecordSource,
};
use crate::infra::{
    checkpoint::{CheckpointManager, RunConfig},
    metrics::MetricsLogger,
    vocab_store::VocabStore,
};
use crate::ml::{
    evaluator::ClassificationReport,
    model::{DenseClassifierConfig, LstmClassifierConfig, ModelSpec},
    trainer::{train, TrainBackend, TrainingOptions, TrainingSummary},
};

type InnerBackend = <TrainBackend as burn::tensor::backend::AutodiffBackend>::InnerBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Architecture {
    /// Feed-forward network over TF-IDF vectors
    Dense,
    /// LSTM over pre-trained word embeddings
    Lstm,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved into train_config.json so inference can rebuild the
// same vectorizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_csv:        String,
    pub val_csv:          Option<String>,
    pub test_csv:         Option<String>,
    pub checkpoint_dir:   String,
    pub arch:             Architecture,
    /// Required for the LSTM
    pub embeddings:       Option<String>,
    pub embedding_format: EmbeddingFormat,
    /// None → take the width from the embedding file
    pub embedding_dim:    Option<usize>,
    pub max_features:     usize,
    pub max_len:          usize,
    /// Cap on the sequence vocabulary, special tokens included
    pub max_words:        Option<usize>,
    pub batch_size:       usize,
    pub epochs:           usize,
    pub lr:               f64,
    pub dense_hidden:     usize,
    pub lstm_hidden:      usize,
    pub dropout:          f64,
    pub patience:         usize,
    pub seed:             u64,
    /// Share of the training CSV held out when no validation CSV is given
    pub val_fraction:     f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_csv:        "data/train.csv".to_string(),
            val_csv:          None,
            test_csv:         None,
            checkpoint_dir:   "checkpoints".to_string(),
            arch:             Architecture::Dense,
            embeddings:       None,
            embedding_format: EmbeddingFormat::Glove,
            embedding_dim:    None,
            max_features:     DEFAULT_MAX_FEATURES,
            max_len:          DEFAULT_MAX_LEN,
            max_words:        None,
            batch_size:       32,
            epochs:           20,
            lr:               1e-3,
            dense_hidden:     512,
            lstm_hidden:      128,
            dropout:          0.5,
            patience:         3,
            seed:             42,
            val_fraction:     0.2,
        }
    }
}

impl TrainConfig {
    fn training_options(&self) -> TrainingOptions {
        TrainingOptions {
            epochs:     self.epochs,
            batch_size: self.batch_size,
            lr:         self.lr,
            patience:   self.patience,
            seed:       self.seed,
        }
    }
}

/// What a finished run hands back to the CLI.
#[derive(Debug)]
pub struct TrainOutcome {
    pub summary: TrainingSummary,
    pub test:    Option<ClassificationReport>,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg     = &self.config;
        let cleaner = TextCleaner::new();

        anyhow::ensure!(cfg.max_len > 0, "--max-len must be at least 1");
        anyhow::ensure!(cfg.lstm_hidden > 0, "--lstm-hidden must be at least 1");

        // ── Steps 1-3: Load, clean, split ─────────────────────────────────────
        let train_records = load_clean(&cfg.train_csv, &cleaner)?;
        let (train_records, val_records) = match &cfg.val_csv {
            Some(path) => (train_records, load_clean(path, &cleaner)?),
            None => split_train_val(train_records, 1.0 - cfg.val_fraction, cfg.seed),
        };
        anyhow::ensure!(!train_records.is_empty(), "no usable training records in '{}'", cfg.train_csv);
        tracing::info!(
            "Split: {} train, {} validation",
            train_records.len(),
            val_records.len()
        );
        log_class_balance(&train_records);

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt.remove_model()?;
        let metrics = MetricsLogger::create(&cfg.checkpoint_dir)?;
        let vocab   = VocabStore::new(&cfg.checkpoint_dir);

        TrainBackend::seed(cfg.seed);
        let device = <TrainBackend as Backend>::Device::default();

        // ── Steps 4-7: Per-architecture features + training ───────────────────
        let summary = match cfg.arch {
            Architecture::Dense => {
                let train_texts: Vec<&str> = train_records.iter().map(|r| r.clean_text.as_str()).collect();
                let mut vectorizer = TfidfVectorizer::new(cfg.max_features);
                vectorizer.fit(&train_texts)?;
                vocab.save_tfidf(&vectorizer)?;

                let to_samples = |records: &[CleanRecord]| -> Vec<TfidfSample> {
                    records
                        .iter()
                        .map(|r| TfidfSample {
                            features: vectorizer.transform_one(&r.clean_text),
                            label:    r.target(),
                        })
                        .collect()
                };
                let train_set = SentimentDataset::new(to_samples(&train_records));
                let valid_set = SentimentDataset::new(to_samples(&val_records));

                let model_cfg = DenseClassifierConfig::new(vectorizer.dim())
                    .with_hidden_size(cfg.dense_hidden)
                    .with_dropout(cfg.dropout);
                ckpt.save_config(&RunConfig { train: cfg.clone(), model: ModelSpec::Dense(model_cfg.clone()) })?;

                let model = model_cfg.init::<TrainBackend>(&device);
                tracing::info!(
                    "Dense model ready: {} inputs, hidden {}/{}/{}",
                    vectorizer.dim(),
                    cfg.dense_hidden,
                    cfg.dense_hidden / 2,
                    cfg.dense_hidden / 4
                );

                train(
                    model,
                    TfidfBatcher::<TrainBackend>::new(device.clone(), vectorizer.dim()),
                    TfidfBatcher::<InnerBackend>::new(device.clone(), vectorizer.dim()),
                    train_set,
                    valid_set,
                    &cfg.training_options(),
                    &ckpt,
                    &metrics,
                )?
            }
            Architecture::Lstm => {
                let embeddings_path = cfg
                    .embeddings
                    .as_deref()
                    .context("--embeddings is required when training the LSTM model")?;

                let train_texts: Vec<&str> = train_records.iter().map(|r| r.clean_text.as_str()).collect();
                let encoder = SequenceEncoder::fit(&train_texts, cfg.max_len, cfg.max_words)?;

                let loader = EmbeddingLoader::new(embeddings_path, cfg.embedding_format, cfg.embedding_dim);
                let (matrix, stats) = loader.build_matrix(&encoder.vocab(), encoder.vocab_size())?;
                tracing::info!(
                    "Embedding coverage: {}/{} vocabulary rows",
                    stats.matched,
                    encoder.vocab_size()
                );
                vocab.save_tokenizer(&encoder)?;

                let to_samples = |records: &[CleanRecord]| -> Result<Vec<SequenceSample>> {
                    records
                        .iter()
                        .map(|r| Ok(SequenceSample::new(encoder.encode(&r.clean_text)?, r.target())))
                        .collect()
                };
                let train_set = SentimentDataset::new(to_samples(&train_records)?);
                let valid_set = SentimentDataset::new(to_samples(&val_records)?);

                let model_cfg = LstmClassifierConfig::new(encoder.vocab_size(), matrix.dim())
                    .with_hidden_size(cfg.lstm_hidden)
                    .with_dropout(cfg.dropout);
                ckpt.save_config(&RunConfig { train: cfg.clone(), model: ModelSpec::Lstm(model_cfg.clone()) })?;

                let model = model_cfg.init_with_embeddings::<TrainBackend>(matrix, &device)?;
                tracing::info!(
                    "LSTM model ready: vocab={}, embedding_dim={}, hidden={}",
                    model_cfg.vocab_size,
                    model_cfg.embedding_dim,
                    cfg.lstm_hidden
                );

                train(
                    model,
                    SequenceBatcher::<TrainBackend>::new(device.clone()),
                    SequenceBatcher::<InnerBackend>::new(device.clone()),
                    train_set,
                    valid_set,
                    &cfg.training_options(),
                    &ckpt,
                    &metrics,
                )?
            }
        };

        // ── Step 8: Evaluate the best checkpoint ──────────────────────────────
        let test = match &cfg.test_csv {
            Some(path) => Some(EvaluateUseCase::new(&cfg.checkpoint_dir).execute(path)?),
            None => None,
        };

        Ok(TrainOutcome { summary, test })
    }
}

/// Load a CSV and drop Irrelevant rows.
pub(crate) fn load_clean(path: &str, cleaner: &TextCleaner) -> Result<Vec<CleanRecord>> {
    tracing::info!("Loading records from '{}'", path);
    let raw = CsvLoader::new(path).load_all()?;
    Ok(cleaner.clean_records(raw))
}

fn log_class_balance(records: &[CleanRecord]) {
    let mut counts = [0usize; NUM_CLASSES];
    for r in records {
        counts[r.target()] += 1;
    }
    for s in Sentiment::ALL {
        tracing::info!("  {:<8} {}", s.as_str(), counts[s.index()]);
    }
}

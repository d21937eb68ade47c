// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `evaluate` and
// `predict`, and all their configurable flags.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::{Architecture, TrainConfig};
use crate::data::embeddings::EmbeddingFormat;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a sentiment model on a labelled CSV
    Train(TrainArgs),

    /// Score a trained checkpoint against a labelled CSV
    Evaluate(EvaluateArgs),

    /// Classify tweets typed on stdin
    Predict(PredictArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ArchArg {
    /// Feed-forward network over TF-IDF features
    Dense,
    /// LSTM over pre-trained word embeddings
    Lstm,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum EmbeddingFormatArg {
    /// Whitespace-separated text (word v1 v2 ...)
    Glove,
    /// Binary word2vec with a "<count> <dim>" header
    Word2vec,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV with `text,label` columns to train on
    #[arg(long)]
    pub train_csv: String,

    /// Optional validation CSV; otherwise the training data is split
    #[arg(long)]
    pub val_csv: Option<String>,

    /// Optional test CSV evaluated with the best checkpoint after training
    #[arg(long)]
    pub test_csv: Option<String>,

    /// Directory to save the checkpoint, vocabulary and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, value_enum, default_value_t = ArchArg::Dense)]
    pub arch: ArchArg,

    /// Pre-trained embedding file (required for --arch lstm)
    #[arg(long)]
    pub embeddings: Option<String>,

    #[arg(long, value_enum, default_value_t = EmbeddingFormatArg::Glove)]
    pub embedding_format: EmbeddingFormatArg,

    /// Expected vector width; read from the file when omitted
    #[arg(long)]
    pub embedding_dim: Option<usize>,

    /// Size of the TF-IDF vocabulary (unigrams + bigrams)
    #[arg(long, default_value_t = 10_000)]
    pub max_features: usize,

    /// Tokens per sequence after padding/truncation
    #[arg(long, default_value_t = 50)]
    pub max_len: usize,

    /// Cap on the sequence vocabulary, <PAD> and <OOV> included
    #[arg(long)]
    pub max_words: Option<usize>,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Upper bound; early stopping may end training sooner
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Width of the dense model's first hidden layer
    #[arg(long, default_value_t = 512)]
    pub dense_hidden: usize,

    /// LSTM hidden state size
    #[arg(long, default_value_t = 128)]
    pub lstm_hidden: usize,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Epochs without validation improvement before stopping (0 = never)
    #[arg(long, default_value_t = 3)]
    pub patience: usize,

    /// Seed for the split, the shuffle and weight initialisation
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Share held out for validation when --val-csv is absent
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,
}

impl From<ArchArg> for Architecture {
    fn from(a: ArchArg) -> Self {
        match a {
            ArchArg::Dense => Architecture::Dense,
            ArchArg::Lstm  => Architecture::Lstm,
        }
    }
}

impl From<EmbeddingFormatArg> for EmbeddingFormat {
    fn from(f: EmbeddingFormatArg) -> Self {
        match f {
            EmbeddingFormatArg::Glove    => EmbeddingFormat::Glove,
            EmbeddingFormatArg::Word2vec => EmbeddingFormat::Word2Vec,
        }
    }
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_csv:        a.train_csv,
            val_csv:          a.val_csv,
            test_csv:         a.test_csv,
            checkpoint_dir:   a.checkpoint_dir,
            arch:             a.arch.into(),
            embeddings:       a.embeddings,
            embedding_format: a.embedding_format.into(),
            embedding_dim:    a.embedding_dim,
            max_features:     a.max_features,
            max_len:          a.max_len,
            max_words:        a.max_words,
            batch_size:       a.batch_size,
            epochs:           a.epochs,
            lr:               a.lr,
            dense_hidden:     a.dense_hidden,
            lstm_hidden:      a.lstm_hidden,
            dropout:          a.dropout,
            patience:         a.patience,
            seed:             a.seed,
            val_fraction:     a.val_fraction.clamp(0.0, 1.0),
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Labelled CSV to score
    #[arg(long)]
    pub test_csv: String,

    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

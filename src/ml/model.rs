use anyhow::{ensure, Result};
use burn::{
    module::Param,
    nn::{
        lstm::{Lstm, LstmConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};
use serde::{Deserialize, Serialize};

use crate::data::batcher::{LabelledBatch, SequenceBatch, TfidfBatch};
use crate::data::embeddings::EmbeddingMatrix;
use crate::domain::sentiment::NUM_CLASSES;

// ─── Shared model interface ───────────────────────────────────────────────────
/// A classifier the training loop can drive: one batch in, logits out.
pub trait SentimentModel<B: Backend>: Module<B> {
    type Batch: LabelledBatch<B> + Clone + Send + std::fmt::Debug + 'static;

    /// Returns logits of shape [batch, NUM_CLASSES].
    fn forward_batch(&self, batch: Self::Batch) -> Tensor<B, 2>;
}

/// Which architecture a checkpoint holds, with everything needed to rebuild it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Dense(DenseClassifierConfig),
    Lstm(LstmClassifierConfig),
}

// ─── Dense classifier over TF-IDF ─────────────────────────────────────────────
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct DenseClassifierConfig {
    /// Number of TF-IDF features
    pub input_dim:   usize,
    /// Width of the first hidden layer; the next two halve it
    #[config(default = 512)]
    pub hidden_size: usize,
    #[config(default = 0.5)]
    pub dropout:     f64,
}

impl DenseClassifierConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> DenseClassifier<B> {
        let h1 = self.hidden_size.max(1);
        let h2 = (h1 / 2).max(1);
        let h3 = (h1 / 4).max(1);
        DenseClassifier {
            hidden1: LinearConfig::new(self.input_dim, h1).init(device),
            hidden2: LinearConfig::new(h1, h2).init(device),
            hidden3: LinearConfig::new(h2, h3).init(device),
            output:  LinearConfig::new(h3, NUM_CLASSES).init(device),
            dropout: DropoutConfig::new(self.dropout).init(),
        }
    }
}

#[derive(Module, Debug)]
pub struct DenseClassifier<B: Backend> {
    pub hidden1: Linear<B>,
    pub hidden2: Linear<B>,
    pub hidden3: Linear<B>,
    pub output:  Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> DenseClassifier<B> {
    /// features: [batch, input_dim] → logits: [batch, 3]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.dropout.forward(relu(self.hidden1.forward(features)));
        let x = self.dropout.forward(relu(self.hidden2.forward(x)));
        let x = self.dropout.forward(relu(self.hidden3.forward(x)));
        self.output.forward(x)
    }
}

impl<B: Backend> SentimentModel<B> for DenseClassifier<B> {
    type Batch = TfidfBatch<B>;

    fn forward_batch(&self, batch: TfidfBatch<B>) -> Tensor<B, 2> {
        self.forward(batch.features)
    }
}

// ─── LSTM classifier over embedded sequences ──────────────────────────────────
#[derive(Config, Debug)]
pub struct LstmClassifierConfig {
    /// Rows of the embedding matrix (sequence vocabulary size)
    pub vocab_size:    usize,
    /// Width of the pre-trained vectors (50 GloVe, 300 Word2Vec)
    pub embedding_dim: usize,
    #[config(default = 128)]
    pub hidden_size:   usize,
    #[config(default = 0.5)]
    pub dropout:       f64,
}

impl LstmClassifierConfig {
    /// Randomly initialised weights, e.g. as a target for `load_record`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmClassifier<B> {
        LstmClassifier {
            embedding:   EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device),
            lstm:        LstmConfig::new(self.embedding_dim, self.hidden_size, true).init(device),
            dropout:     DropoutConfig::new(self.dropout).init(),
            head:        LinearConfig::new(self.hidden_size, NUM_CLASSES).init(device),
            hidden_size: self.hidden_size,
        }
    }

    /// Copy the pre-trained matrix into the embedding layer and freeze it.
    pub fn init_with_embeddings<B: Backend>(
        &self,
        matrix: EmbeddingMatrix,
        device: &B::Device,
    ) -> Result<LstmClassifier<B>> {
        ensure!(
            matrix.rows() == self.vocab_size && matrix.dim() == self.embedding_dim,
            "embedding matrix is {}x{}, model expects {}x{}",
            matrix.rows(), matrix.dim(), self.vocab_size, self.embedding_dim,
        );

        let shape   = [matrix.rows(), matrix.dim()];
        let weights = Tensor::<B, 2>::from_data(TensorData::new(matrix.into_data(), shape), device);

        let mut model = self.init(device);
        model.embedding.weight = Param::from_tensor(weights);
        model.embedding = model.embedding.no_grad();
        Ok(model)
    }
}

#[derive(Module, Debug)]
pub struct LstmClassifier<B: Backend> {
    pub embedding:   Embedding<B>,
    pub lstm:        Lstm<B>,
    pub dropout:     Dropout,
    pub head:        Linear<B>,
    pub hidden_size: usize,
}

impl<B: Backend> LstmClassifier<B> {
    /// tokens: [batch, max_len], lengths: [batch] → logits: [batch, 3]
    ///
    /// Sequences are padded at the end, so the state after the last
    /// real token (position length - 1) summarises the tweet.
    /// Empty sequences read position 0.
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, lengths: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [batch_size, _] = tokens.dims();

        let embedded    = self.embedding.forward(tokens);     // [batch, max_len, emb]
        let (states, _) = self.lstm.forward(embedded, None);   // [batch, max_len, hidden]

        let last = lengths
            .sub_scalar(1)
            .clamp_min(0)
            .reshape([batch_size, 1, 1])
            .expand([batch_size, 1, self.hidden_size]);
        let pooled = states.gather(1, last).reshape([batch_size, self.hidden_size]);

        self.head.forward(self.dropout.forward(pooled))
    }
}

impl<B: Backend> SentimentModel<B> for LstmClassifier<B> {
    type Batch = SequenceBatch<B>;

    fn forward_batch(&self, batch: SequenceBatch<B>) -> Tensor<B, 2> {
        self.forward(batch.tokens, batch.lengths)
    }
}

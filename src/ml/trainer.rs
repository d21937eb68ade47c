// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Burn's DataLoader and Adam,
// shared by both architectures through `SentimentModel`.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on the inner backend with
//     dropout disabled, so the validation batcher must build
//     inner-backend batches too
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// After each epoch the validation loss is compared with the
// best so far. Only an improvement overwrites the checkpoint;
// `patience` epochs without one stop training early.

use anyhow::{bail, ensure, Result};
use burn::{
    data::dataloader::{batcher::Batcher, DataLoaderBuilder},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::LabelledBatch;
use crate::data::dataset::SentimentDataset;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::SentimentModel;

#[cfg(not(feature = "wgpu"))]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
#[cfg(feature = "wgpu")]
pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Loop hyperparameters; the model's own live in its Config.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    /// Epochs without improvement before stopping. 0 disables early stopping.
    pub patience:   usize,
    /// Shuffle seed for the training loader
    pub seed:       u64,
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub best_epoch:    usize,
    pub best_val_loss: f64,
    pub stopped_early: bool,
    pub history:       Vec<EpochMetrics>,
}

// ─── Early stopping ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Improved,
    /// Number of consecutive epochs without improvement
    Waiting(usize),
    Stop,
}

#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience:   usize,
    best:       f64,
    best_epoch: Option<usize>,
    bad_epochs: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self { patience, best: f64::INFINITY, best_epoch: None, bad_epochs: 0 }
    }

    /// Record one epoch's monitored loss. NaN never counts as an improvement.
    pub fn update(&mut self, epoch: usize, loss: f64) -> Progress {
        if loss < self.best {
            self.best       = loss;
            self.best_epoch = Some(epoch);
            self.bad_epochs = 0;
            return Progress::Improved;
        }
        self.bad_epochs += 1;
        if self.patience > 0 && self.bad_epochs >= self.patience {
            Progress::Stop
        } else {
            Progress::Waiting(self.bad_epochs)
        }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }
}

// ─── Per-epoch accumulators ───────────────────────────────────────────────────
#[derive(Debug, Default)]
struct RunningStats {
    loss_sum: f64,
    batches:  usize,
    correct:  usize,
    samples:  usize,
}

impl RunningStats {
    fn add<B: Backend>(&mut self, loss: f64, logits: &Tensor<B, 2>, targets: &Tensor<B, 1, Int>) {
        self.loss_sum += loss;
        self.batches  += 1;
        self.samples  += targets.dims()[0];
        self.correct  += count_correct(logits, targets);
    }

    fn mean_loss(&self) -> f64 {
        if self.batches > 0 { self.loss_sum / self.batches as f64 } else { f64::NAN }
    }

    fn accuracy(&self) -> f64 {
        if self.samples > 0 { self.correct as f64 / self.samples as f64 } else { 0.0 }
    }
}

fn count_correct<B: Backend>(logits: &Tensor<B, 2>, targets: &Tensor<B, 1, Int>) -> usize {
    // argmax(1) returns shape [batch, 1]
    let predicted = logits.clone().argmax(1).flatten::<1>(0, 1);
    predicted
        .equal(targets.clone())
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>() as usize
}

/// Overwrite the checkpoint only when the epoch improved.
/// Returns whether it was written.
fn checkpoint_on_improvement<B: Backend, M: Module<B>>(
    progress: Progress,
    ckpt:     &CheckpointManager,
    model:    &M,
) -> Result<bool> {
    if progress != Progress::Improved {
        return Ok(false);
    }
    ckpt.save_model::<B, _>(model)?;
    Ok(true)
}

// ─── Training loop ────────────────────────────────────────────────────────────
/// Train `model` and keep its best epoch in `ckpt`.
///
/// When the validation set is empty the training loss is
/// monitored instead so a checkpoint is still produced.
#[allow(clippy::too_many_arguments)]
pub fn train<B, M, S, BT, BV>(
    mut model:     M,
    train_batcher: BT,
    valid_batcher: BV,
    train_set:     SentimentDataset<S>,
    valid_set:     SentimentDataset<S>,
    opts:          &TrainingOptions,
    ckpt:          &CheckpointManager,
    metrics:       &MetricsLogger,
) -> Result<TrainingSummary>
where
    B:  AutodiffBackend,
    M:  SentimentModel<B> + AutodiffModule<B>,
    M::InnerModule: SentimentModel<B::InnerBackend>,
    S:  Clone + Send + Sync + std::fmt::Debug + 'static,
    BT: Batcher<S, M::Batch> + Clone + 'static,
    BV: Batcher<S, <M::InnerModule as SentimentModel<B::InnerBackend>>::Batch> + Clone + 'static,
{
    ensure!(train_set.sample_count() > 0, "training set is empty");
    let monitor_train = valid_set.sample_count() == 0;
    if monitor_train {
        tracing::warn!("Validation set is empty; early stopping will monitor training loss");
    }

    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(opts.batch_size.max(1))
        .shuffle(opts.seed)
        .num_workers(1)
        .build(train_set);

    // Inner backend: no autodiff overhead
    let valid_loader = DataLoaderBuilder::new(valid_batcher)
        .batch_size(opts.batch_size.max(1))
        .num_workers(1)
        .build(valid_set);

    let mut stopper       = EarlyStopping::new(opts.patience);
    let mut history       = Vec::with_capacity(opts.epochs);
    let mut stopped_early = false;

    for epoch in 1..=opts.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_stats = RunningStats::default();

        for batch in train_loader.iter() {
            let targets = batch.targets();
            let logits  = model.forward_batch(batch);
            let loss    = CrossEntropyLossConfig::new()
                .init(&logits.device())
                .forward(logits.clone(), targets.clone());

            train_stats.add(loss.clone().into_scalar().elem::<f64>(), &logits, &targets);

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(opts.lr, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let mut valid_stats = RunningStats::default();

        for batch in valid_loader.iter() {
            let targets = batch.targets();
            let logits  = model_valid.forward_batch(batch);
            let loss    = CrossEntropyLossConfig::new()
                .init(&logits.device())
                .forward(logits.clone(), targets.clone());

            valid_stats.add(loss.into_scalar().elem::<f64>(), &logits, &targets);
        }

        let row = EpochMetrics::new(
            epoch,
            train_stats.mean_loss(),
            valid_stats.mean_loss(),
            train_stats.accuracy(),
            valid_stats.accuracy(),
        );
        metrics.log(&row)?;

        let monitored = if monitor_train { row.train_loss } else { row.val_loss };
        let progress  = stopper.update(epoch, monitored);

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | train_acc={:.1}% | val_acc={:.1}%{}",
            epoch,
            opts.epochs,
            row.train_loss,
            row.val_loss,
            row.train_acc * 100.0,
            row.val_acc * 100.0,
            if progress == Progress::Improved { " *" } else { "" },
        );
        history.push(row);

        if checkpoint_on_improvement::<B::InnerBackend, _>(progress, ckpt, &model_valid)? {
            tracing::info!("Validation loss improved to {:.4}; checkpoint saved", monitored);
        }
        match progress {
            Progress::Waiting(n) => tracing::debug!("No improvement for {} epoch(s)", n),
            Progress::Stop => {
                tracing::info!(
                    "Early stopping after epoch {}: no improvement for {} epochs",
                    epoch,
                    opts.patience
                );
                stopped_early = true;
                break;
            }
            Progress::Improved => {}
        }
    }

    let Some(best_epoch) = stopper.best_epoch() else {
        bail!("training produced no finite validation loss; no checkpoint was written");
    };

    tracing::info!(
        "Training complete! Best epoch {} with val_loss={:.4}",
        best_epoch,
        stopper.best()
    );
    Ok(TrainingSummary {
        best_epoch,
        best_val_loss: stopper.best(),
        stopped_early,
        history,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::TfidfBatcher;
    use crate::data::dataset::TfidfSample;
    use crate::data::tfidf::SparseVector;
    use crate::ml::model::{DenseClassifier, DenseClassifierConfig};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn test_early_stopping_waits_then_stops() {
        let mut s = EarlyStopping::new(2);
        assert_eq!(s.update(1, 1.0), Progress::Improved);
        assert_eq!(s.update(2, 0.8), Progress::Improved);
        assert_eq!(s.update(3, 0.9), Progress::Waiting(1));
        assert_eq!(s.update(4, 0.7), Progress::Improved);
        assert_eq!(s.update(5, 0.7), Progress::Waiting(1));
        assert_eq!(s.update(6, 0.75), Progress::Stop);
        assert_eq!(s.best_epoch(), Some(4));
        assert!((s.best() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_nan_is_never_an_improvement() {
        let mut s = EarlyStopping::new(0);
        assert_eq!(s.update(1, f64::NAN), Progress::Waiting(1));
        assert_eq!(s.best_epoch(), None);
        // patience 0 never stops
        assert_eq!(s.update(2, f64::NAN), Progress::Waiting(2));
    }

    fn samples(n: usize) -> Vec<TfidfSample> {
        (0..n)
            .map(|i| {
                let label = i % 3;
                TfidfSample {
                    features: SparseVector { indices: vec![label as u32], values: vec![1.0] },
                    label,
                }
            })
            .collect()
    }

    #[test]
    fn test_training_writes_best_checkpoint_and_metrics() {
        let tmp     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path()).unwrap();
        let metrics = MetricsLogger::create(tmp.path()).unwrap();
        let device  = Default::default();

        let model: DenseClassifier<TestBackend> = DenseClassifierConfig::new(4)
            .with_hidden_size(8)
            .with_dropout(0.0)
            .init(&device);

        let opts = TrainingOptions { epochs: 3, batch_size: 4, lr: 1e-2, patience: 3, seed: 7 };
        let summary = train(
            model,
            TfidfBatcher::<TestBackend>::new(device.clone(), 4),
            TfidfBatcher::<NdArray>::new(device, 4),
            SentimentDataset::new(samples(12)),
            SentimentDataset::new(samples(6)),
            &opts,
            &ckpt,
            &metrics,
        )
        .unwrap();

        assert!(ckpt.has_model());
        assert!((1..=3).contains(&summary.best_epoch));
        assert_eq!(summary.history.len(), 3);
        assert!(!summary.stopped_early);
        assert_eq!(metrics.read_all().unwrap().len(), 3);

        let best = summary.history[summary.best_epoch - 1].val_loss;
        assert!((best - summary.best_val_loss).abs() < 1e-9);
        assert!(summary.history.iter().all(|m| m.val_loss >= summary.best_val_loss));
    }

    #[test]
    fn test_only_improving_epochs_touch_the_checkpoint() {
        let tmp    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(tmp.path()).unwrap();
        let device = Default::default();
        let cfg    = DenseClassifierConfig::new(4).with_hidden_size(8);

        let first: DenseClassifier<NdArray> = cfg.init(&device);
        assert!(checkpoint_on_improvement::<NdArray, _>(Progress::Improved, &ckpt, &first).unwrap());
        let saved = std::fs::read(ckpt.model_file()).unwrap();

        // A differently initialised model must not replace the saved one
        let second: DenseClassifier<NdArray> = cfg.init(&device);
        assert!(!checkpoint_on_improvement::<NdArray, _>(Progress::Waiting(1), &ckpt, &second).unwrap());
        assert!(!checkpoint_on_improvement::<NdArray, _>(Progress::Stop, &ckpt, &second).unwrap());
        assert_eq!(std::fs::read(ckpt.model_file()).unwrap(), saved);

        assert!(checkpoint_on_improvement::<NdArray, _>(Progress::Improved, &ckpt, &second).unwrap());
        assert_ne!(std::fs::read(ckpt.model_file()).unwrap(), saved);
    }

    #[test]
    fn test_frozen_model_keeps_first_epoch_as_best() {
        let tmp     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path()).unwrap();
        let metrics = MetricsLogger::create(tmp.path()).unwrap();
        let device  = Default::default();

        let model: DenseClassifier<TestBackend> = DenseClassifierConfig::new(4)
            .with_hidden_size(8)
            .with_dropout(0.0)
            .init(&device);

        // lr 0 leaves the weights alone, so later epochs tie and never improve
        let opts = TrainingOptions { epochs: 3, batch_size: 4, lr: 0.0, patience: 0, seed: 1 };
        let summary = train(
            model,
            TfidfBatcher::<TestBackend>::new(device.clone(), 4),
            TfidfBatcher::<NdArray>::new(device, 4),
            SentimentDataset::new(samples(8)),
            SentimentDataset::new(samples(6)),
            &opts,
            &ckpt,
            &metrics,
        )
        .unwrap();

        assert_eq!(summary.best_epoch, 1);
        assert_eq!(summary.history.len(), 3);
        assert!(ckpt.has_model());
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let tmp     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path()).unwrap();
        let metrics = MetricsLogger::create(tmp.path()).unwrap();
        let device  = Default::default();

        let model: DenseClassifier<TestBackend> = DenseClassifierConfig::new(4).init(&device);
        let opts = TrainingOptions { epochs: 1, batch_size: 2, lr: 1e-3, patience: 1, seed: 0 };
        let result = train(
            model,
            TfidfBatcher::<TestBackend>::new(device.clone(), 4),
            TfidfBatcher::<NdArray>::new(device, 4),
            SentimentDataset::new(Vec::new()),
            SentimentDataset::new(samples(3)),
            &opts,
            &ckpt,
            &metrics,
        );
        assert!(result.is_err());
        assert!(!ckpt.has_model());
    }
}

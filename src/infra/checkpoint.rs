// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// A run keeps exactly one set of weights: the epoch with the
// lowest validation loss. Every improvement overwrites it.
//
//   checkpoints/
//     model.mpk           ← best weights so far
//     train_config.json   ← TrainConfig + architecture (ModelSpec)
//
// The inferencer reads train_config.json first so it can
// rebuild the right architecture before loading the weights.
// Loading fails if the record and the architecture disagree.
//
// A new run deletes the previous weights before it writes any
// config or vocabulary, so a run that fails midway never leaves
// old weights next to a new vocabulary.

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::ModelSpec;

const MODEL_STEM:  &str = "model";
/// CompactRecorder is burn's named MessagePack recorder
const MODEL_EXT:   &str = "mpk";
const CONFIG_FILE: &str = "train_config.json";

/// Everything `train_config.json` holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub train: TrainConfig,
    pub model: ModelSpec,
}

/// Manages the model checkpoint and its config.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing checkpoint directory without creating it.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the weights file, including the recorder's extension.
    pub fn model_file(&self) -> PathBuf {
        self.dir.join(format!("{MODEL_STEM}.{MODEL_EXT}"))
    }

    pub fn has_model(&self) -> bool {
        self.model_file().exists()
    }

    /// Delete the weights left by an earlier run, if any.
    pub fn remove_model(&self) -> Result<()> {
        let path = self.model_file();
        if self.has_model() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove stale checkpoint '{}'", path.display()))?;
            tracing::debug!("Removed previous checkpoint '{}'", path.display());
        }
        Ok(())
    }

    /// Overwrite the checkpoint with `model`'s weights.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M) -> Result<()> {
        // The recorder appends the extension itself
        let path = self.dir.join(MODEL_STEM);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved checkpoint '{}'", self.model_file().display());
        Ok(())
    }

    /// Load the saved weights into `model`, which must have the
    /// architecture the checkpoint was trained with.
    pub fn load_model<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        let path = self.dir.join(MODEL_STEM);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Must be written before training so an interrupted run
    /// still leaves a loadable checkpoint directory.
    pub fn save_config(&self, cfg: &RunConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<RunConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' first.",
                path.display()
            )
        })?;

        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::{DenseClassifier, DenseClassifierConfig};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_model_round_trip() {
        let tmp    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(tmp.path().join("ckpt")).unwrap();
        let device = Default::default();
        let cfg    = DenseClassifierConfig::new(6).with_hidden_size(8);

        let model: DenseClassifier<TestBackend> = cfg.init(&device);
        assert!(!ckpt.has_model());
        ckpt.save_model::<TestBackend, _>(&model).unwrap();
        assert!(ckpt.has_model());
        assert!(ckpt.model_file().ends_with("model.mpk"));

        let fresh: DenseClassifier<TestBackend> = cfg.init(&device);
        let loaded = ckpt.load_model::<TestBackend, _>(fresh, &device).unwrap();

        let before: Vec<f32> = model.output.weight.val().into_data().to_vec().unwrap();
        let after:  Vec<f32> = loaded.output.weight.val().into_data().to_vec().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_model_clears_previous_weights() {
        let tmp    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(tmp.path()).unwrap();
        let device = Default::default();

        // Nothing to remove yet
        ckpt.remove_model().unwrap();

        let model: DenseClassifier<TestBackend> = DenseClassifierConfig::new(3).init(&device);
        ckpt.save_model::<TestBackend, _>(&model).unwrap();
        ckpt.remove_model().unwrap();
        assert!(!ckpt.has_model());
        assert!(ckpt.load_model::<TestBackend, _>(model, &device).is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path()).unwrap();
        let run  = RunConfig {
            train: TrainConfig::default(),
            model: ModelSpec::Dense(DenseClassifierConfig::new(42)),
        };
        ckpt.save_config(&run).unwrap();

        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.train.batch_size, run.train.batch_size);
        match loaded.model {
            ModelSpec::Dense(cfg) => assert_eq!(cfg.input_dim, 42),
            other => panic!("unexpected model {other:?}"),
        }
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::open(tmp.path());
        assert!(ckpt.load_config().is_err());

        let device = Default::default();
        let model: DenseClassifier<TestBackend> = DenseClassifierConfig::new(3).init(&device);
        assert!(ckpt.load_model::<TestBackend, _>(model, &device).is_err());
    }
}

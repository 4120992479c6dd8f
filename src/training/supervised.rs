//! Supervised training loop for the combined deepfake classifier.
//!
//! A custom epoch loop over Burn's optimizer API: forward, cross-entropy
//! loss, backward, step, with per-epoch validation and best-by-validation-
//! loss checkpointing. Only the sequence classifier's parameters are
//! registered with the optimizer; the extractor stays frozen (its features
//! are detached in the combined forward pass, so it receives no gradients
//! either way).

use std::path::PathBuf;

use burn::{
    data::dataloader::batcher::Batcher,
    module::{AutodiffModule, Module},
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    record::CompactRecorder,
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use colored::Colorize;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::{split_dirs, FrameBatch, FrameBatcher, FrameBurnDataset, FrameDataset};
use crate::model::{DeepfakeClassifier, DeepfakeClassifierConfig, FeatureExtractorConfig};
use crate::utils::error::{DeepframeError, Result};
use crate::utils::logging::TrainingLogger;
use crate::utils::metrics::EpochStats;

use super::{DEFAULT_BATCH_SIZE, DEFAULT_EPOCHS, DEFAULT_LEARNING_RATE};

/// Filename stem for the best combined checkpoint (written during the loop)
pub const BEST_CHECKPOINT: &str = "model_best";

/// Filename stem for the final extractor state (written once at the end)
pub const EXTRACTOR_CHECKPOINT: &str = "model";

/// Everything the training run needs, passed explicitly — no module-level
/// globals.
#[derive(Debug)]
pub struct TrainSettings {
    /// Data root containing `frames/classified sets/{...}`
    pub data_dir: PathBuf,
    /// Directory for checkpoint output
    pub output_dir: PathBuf,
    /// Number of epochs
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Seed for per-epoch shuffling
    pub seed: u64,
    /// Optional pre-trained extractor (backbone + fine-tuned head) to load
    pub extractor_checkpoint: Option<PathBuf>,
    /// Optional combined-model checkpoint to resume from
    pub combined_checkpoint: Option<PathBuf>,
    /// Model architecture
    pub model: DeepfakeClassifierConfig,
}

impl TrainSettings {
    pub fn new(data_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output_dir: output_dir.into(),
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: 42,
            extractor_checkpoint: None,
            combined_checkpoint: None,
            model: DeepfakeClassifierConfig::new(FeatureExtractorConfig::new()),
        }
    }
}

/// Per-epoch record returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct EpochReport {
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
    pub is_best: bool,
}

/// Summary of a completed training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub epochs: Vec<EpochReport>,
    pub best_val_loss: f64,
    /// Path of the best combined checkpoint, if any epoch improved
    pub best_checkpoint: Option<PathBuf>,
    /// Path of the final extractor state
    pub extractor_checkpoint: PathBuf,
}

/// Checkpoint policy: save only on strict improvement. NaN compares false
/// against everything, so a NaN validation loss never triggers a save.
pub(crate) fn improved(current: f64, best: f64) -> bool {
    current < best
}

/// Run the full training loop.
///
/// Fails fast before the first epoch when a split directory is missing or
/// empty, or when a provided checkpoint cannot be loaded.
pub fn run_training<B: AutodiffBackend>(
    settings: &TrainSettings,
    device: &B::Device,
) -> Result<TrainReport> {
    std::fs::create_dir_all(&settings.output_dir)?;

    let (train_dir, val_dir, _test_dir) = split_dirs(&settings.data_dir);

    println!("{}", "Loading datasets...".cyan());
    let train_scan = FrameDataset::new(&train_dir)?;
    let val_scan = FrameDataset::new(&val_dir)?;

    info!(
        "Training on {} samples, validating on {} samples ({} classes)",
        train_scan.len(),
        val_scan.len(),
        train_scan.num_classes()
    );

    let train_dataset = FrameBurnDataset::from_loader(&train_scan);
    let val_dataset = FrameBurnDataset::from_loader(&val_scan);
    let batcher = FrameBatcher::new();

    println!("{}", "Building model...".cyan());
    let mut model = settings.model.init::<B>(device);

    let recorder = CompactRecorder::new();
    if let Some(path) = &settings.extractor_checkpoint {
        info!("Loading extractor checkpoint from {:?}", path);
        let extractor = model.extractor;
        model.extractor = extractor.load_file(path, &recorder, device).map_err(|e| {
            DeepframeError::Checkpoint(format!("loading extractor {:?}: {:?}", path, e))
        })?;
    }
    if let Some(path) = &settings.combined_checkpoint {
        info!("Loading combined checkpoint from {:?}", path);
        model = model.load_file(path, &recorder, device).map_err(|e| {
            DeepframeError::Checkpoint(format!("loading combined model {:?}: {:?}", path, e))
        })?;
    }

    // Only the recurrent classifier is optimized; the extractor (head
    // included) is frozen by the detached feature pass.
    let mut optimizer = AdamConfig::new().init();

    let mut logger = TrainingLogger::new(settings.epochs);
    let mut epoch_rng = ChaCha8Rng::seed_from_u64(settings.seed);

    let best_path = settings.output_dir.join(BEST_CHECKPOINT);
    let mut best_val_loss = f64::INFINITY;
    let mut best_checkpoint: Option<PathBuf> = None;
    let mut reports = Vec::with_capacity(settings.epochs);

    println!("{}", "Starting training...".green().bold());

    for epoch in 0..settings.epochs {
        logger.start_epoch(epoch);

        let mut train_stats = EpochStats::new();

        let mut indices: Vec<usize> = (0..train_scan.len()).collect();
        indices.shuffle(&mut epoch_rng);
        let num_batches = indices.len().div_ceil(settings.batch_size);

        for batch_idx in 0..num_batches {
            let start = batch_idx * settings.batch_size;
            let end = (start + settings.batch_size).min(indices.len());

            let items = indices[start..end]
                .iter()
                .map(|&i| train_dataset.try_get(i))
                .collect::<Result<Vec<_>>>()?;

            let batch: FrameBatch<B> = batcher.batch(items, device);
            let batch_size = batch.targets.dims()[0];

            // Forward and loss
            let output = model.forward(batch.images.clone());
            let loss = CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output.clone(), batch.targets.clone());
            let loss_value: f64 = loss.clone().into_scalar().elem();

            // Exact-match count for accuracy
            let predictions = output.argmax(1).reshape([batch_size]);
            let batch_correct: i64 = predictions
                .equal(batch.targets.clone())
                .int()
                .sum()
                .into_scalar()
                .elem();

            train_stats.record(loss_value, batch_size, batch_correct as usize);

            // Backward and step over the sequence classifier only
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model.sequence);
            let sequence = model.sequence;
            model.sequence = optimizer.step(settings.learning_rate, sequence, grads);

            if (batch_idx + 1) % 10 == 0 || batch_idx == num_batches - 1 {
                debug!(
                    "Batch {}/{}: loss = {:.4}, acc = {:.2}%",
                    batch_idx + 1,
                    num_batches,
                    loss_value,
                    100.0 * train_stats.accuracy()
                );
            }
        }

        println!(
            "Epoch [{}/{}], Train Loss: {:.4}, Train Accuracy: {:.4}",
            epoch + 1,
            settings.epochs,
            train_stats.loss(),
            train_stats.accuracy()
        );

        let (val_loss, val_accuracy) =
            validate::<B>(&model, &val_dataset, &batcher, settings.batch_size, device)?;
        println!(
            "Validation Loss: {:.4}, Validation Accuracy: {:.4}",
            val_loss, val_accuracy
        );

        let is_best = improved(val_loss, best_val_loss);
        if is_best {
            best_val_loss = val_loss;
            model
                .clone()
                .save_file(&best_path, &recorder)
                .map_err(|e| {
                    DeepframeError::Checkpoint(format!("saving {:?}: {:?}", best_path, e))
                })?;
            best_checkpoint = Some(best_path.clone());
            logger.log_new_best(val_loss);
        }

        reports.push(EpochReport {
            epoch,
            train_loss: train_stats.loss(),
            train_accuracy: train_stats.accuracy(),
            val_loss,
            val_accuracy,
            is_best,
        });

        logger.end_epoch(train_stats.loss(), val_loss, val_accuracy);
    }

    // The combined weights persist only through the in-loop best checkpoint;
    // the terminal write covers the extractor alone.
    let extractor_path = settings.output_dir.join(EXTRACTOR_CHECKPOINT);
    model
        .extractor
        .clone()
        .save_file(&extractor_path, &recorder)
        .map_err(|e| {
            DeepframeError::Checkpoint(format!("saving {:?}: {:?}", extractor_path, e))
        })?;

    logger.log_complete(best_val_loss);

    Ok(TrainReport {
        epochs: reports,
        best_val_loss,
        best_checkpoint,
        extractor_checkpoint: extractor_path,
    })
}

/// Evaluate the model on a dataset in scan order.
///
/// Runs on the inner (non-autodiff) backend with dropout disabled and no
/// parameter updates. Returns (weighted average loss, accuracy).
pub fn validate<B: AutodiffBackend>(
    model: &DeepfakeClassifier<B>,
    dataset: &FrameBurnDataset,
    batcher: &FrameBatcher,
    batch_size: usize,
    device: &B::Device,
) -> Result<(f64, f64)> {
    use burn::data::dataset::Dataset;

    let inference = model.valid();
    let mut stats = EpochStats::new();

    for start in (0..dataset.len()).step_by(batch_size) {
        let end = (start + batch_size).min(dataset.len());
        let items = (start..end)
            .map(|i| dataset.try_get(i))
            .collect::<Result<Vec<_>>>()?;

        let batch: FrameBatch<B::InnerBackend> = batcher.batch(items, device);
        let count = batch.targets.dims()[0];

        let output = inference.forward(batch.images);
        let loss = CrossEntropyLossConfig::new()
            .init(&output.device())
            .forward(output.clone(), batch.targets.clone());
        let loss_value: f64 = loss.into_scalar().elem();

        let predictions = output.argmax(1).reshape([count]);
        let batch_correct: i64 = predictions
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem();

        stats.record(loss_value, count, batch_correct as usize);
    }

    Ok((stats.loss(), stats.accuracy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_improvement_policy() {
        assert!(improved(0.5, f64::INFINITY));
        assert!(improved(0.4, 0.5));
        // Ties do not trigger a save.
        assert!(!improved(0.5, 0.5));
        assert!(!improved(0.6, 0.5));
    }

    #[test]
    fn test_nan_never_improves() {
        // NaN comparisons are always false: a NaN validation loss neither
        // improves nor fails loudly.
        assert!(!improved(f64::NAN, 0.5));
        assert!(!improved(f64::NAN, f64::INFINITY));
        // And a later finite loss never beats a best that was never set low.
        assert!(improved(0.3, f64::INFINITY));
    }

    #[test]
    fn test_default_settings() {
        let settings = TrainSettings::new("data", "out");
        assert_eq!(settings.epochs, 5);
        assert_eq!(settings.batch_size, 32);
        assert_eq!(settings.learning_rate, 0.001);
        assert!(settings.extractor_checkpoint.is_none());
        assert!(settings.combined_checkpoint.is_none());
    }
}

//! # deepframe
//!
//! Deepfake-vs-real classification of pre-extracted video frames using the
//! Burn framework. A frozen convolutional feature extractor produces a
//! spatial feature map that is reinterpreted as a sequence (spatial
//! positions become time steps, channel depth the per-step feature vector)
//! and classified by a single-layer LSTM.
//!
//! ## Modules
//!
//! - `dataset`: class-labeled split directories, lazy image loading, batching
//! - `model`: feature extractor, sequence classifier, combined model
//! - `training`: supervised loop with validation and best checkpointing
//! - `utils`: errors, logging, metric bookkeeping
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use deepframe::backend::TrainingBackend;
//! use deepframe::training::TrainSettings;
//!
//! let settings = TrainSettings::new("data", "output");
//! let device = deepframe::backend::default_device();
//! let report = deepframe::training::run_training::<TrainingBackend>(&settings, &device)?;
//! ```

pub mod backend;
pub mod dataset;
pub mod model;
pub mod training;
pub mod utils;

// Re-export commonly used items for convenience
pub use dataset::{FrameBatch, FrameBatcher, FrameBurnDataset, FrameDataset, FrameItem};
pub use model::{
    DeepfakeClassifier, DeepfakeClassifierConfig, FeatureExtractor, FeatureExtractorConfig,
    SequenceClassifier, SequenceClassifierConfig,
};
pub use training::{run_training, TrainReport, TrainSettings};
pub use utils::error::{DeepframeError, Result};

/// Binary classification: deepfake vs. real
pub const NUM_CLASSES: usize = 2;

/// Input image size (frames are resized to squares of this side)
pub const IMAGE_SIZE: usize = 224;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

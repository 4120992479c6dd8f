//! Training: the supervised epoch loop with per-epoch validation and
//! best-by-validation-loss checkpointing.

pub mod supervised;

pub use supervised::{
    run_training, validate, EpochReport, TrainReport, TrainSettings, BEST_CHECKPOINT,
    EXTRACTOR_CHECKPOINT,
};

/// Default number of training epochs
pub const DEFAULT_EPOCHS: usize = 5;

/// Default batch size
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Default learning rate
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;

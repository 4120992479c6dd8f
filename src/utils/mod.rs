//! Shared utilities: error types, logging, and metric bookkeeping.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{DeepframeError, Result};
pub use logging::{init_logging, LogConfig, TrainingLogger};
pub use metrics::EpochStats;

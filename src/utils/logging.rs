//! Logging setup built on the `tracing` crate.
//!
//! The training loop prints its per-epoch summary lines synchronously with
//! `println!`; tracing carries everything else (dataset scans, checkpoint
//! writes, batch-level progress at debug level).

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to include target (module path)
    pub include_target: bool,
    /// Whether to use ANSI colors
    pub ansi_colors: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            include_target: false,
            ansi_colors: true,
        }
    }
}

impl LogConfig {
    /// Verbose config for debugging (batch-level progress)
    pub fn verbose() -> Self {
        Self {
            level: Level::DEBUG,
            include_target: true,
            ansi_colors: true,
        }
    }

    /// Errors only
    pub fn quiet() -> Self {
        Self {
            level: Level::ERROR,
            include_target: false,
            ansi_colors: true,
        }
    }
}

/// Initialize the global tracing subscriber.
///
/// Returns an error string if a subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}

/// Tracks wall-clock timing across a training run for epoch summaries.
pub struct TrainingLogger {
    epoch: usize,
    total_epochs: usize,
    epoch_start: std::time::Instant,
    training_start: std::time::Instant,
}

impl TrainingLogger {
    pub fn new(total_epochs: usize) -> Self {
        Self {
            epoch: 0,
            total_epochs,
            epoch_start: std::time::Instant::now(),
            training_start: std::time::Instant::now(),
        }
    }

    /// Mark the start of an epoch
    pub fn start_epoch(&mut self, epoch: usize) {
        self.epoch = epoch;
        self.epoch_start = std::time::Instant::now();

        tracing::info!("Epoch {}/{} started", epoch + 1, self.total_epochs);
    }

    /// Log the end of an epoch with train/validation metrics
    pub fn end_epoch(&self, train_loss: f64, val_loss: f64, val_accuracy: f64) {
        let epoch_time = self.epoch_start.elapsed();

        tracing::info!(
            "Epoch {}/{} completed in {:.1}s | Train Loss: {:.4} | Val Loss: {:.4} | Val Acc: {:.2}%",
            self.epoch + 1,
            self.total_epochs,
            epoch_time.as_secs_f64(),
            train_loss,
            val_loss,
            val_accuracy * 100.0
        );
    }

    /// Log a new best checkpoint
    pub fn log_new_best(&self, val_loss: f64) {
        tracing::info!("New best model (val loss {:.4})", val_loss);
    }

    /// Log training completion
    pub fn log_complete(&self, best_val_loss: f64) {
        let total_time = self.training_start.elapsed();

        tracing::info!(
            "Training complete! {} epochs in {:.1}s | Best val loss: {:.4}",
            self.total_epochs,
            total_time.as_secs_f64(),
            best_val_loss
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.include_target);
    }

    #[test]
    fn test_verbose_config() {
        let config = LogConfig::verbose();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_target);
    }
}

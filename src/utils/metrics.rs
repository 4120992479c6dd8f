//! Loss and accuracy bookkeeping for the train/validate loops.
//!
//! Epoch loss is the batch-size-weighted average of per-batch losses
//! (sum of loss × batch size, divided by samples seen), matching the
//! per-sample averaging the loop reports.

/// Running statistics accumulated over one epoch (train or validation).
#[derive(Debug, Clone, Default)]
pub struct EpochStats {
    /// Sum of per-batch loss × batch size
    weighted_loss: f64,
    /// Number of exact-match predictions
    correct: usize,
    /// Total samples seen
    total: usize,
}

impl EpochStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one batch: its mean loss, its size, and how many predictions
    /// matched the targets.
    pub fn record(&mut self, batch_loss: f64, batch_size: usize, batch_correct: usize) {
        self.weighted_loss += batch_loss * batch_size as f64;
        self.correct += batch_correct;
        self.total += batch_size;
    }

    /// Batch-size-weighted average loss over the epoch.
    pub fn loss(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.weighted_loss / self.total as f64
        }
    }

    /// Exact-match accuracy in [0, 1].
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Total samples seen this epoch.
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_loss_average() {
        let mut stats = EpochStats::new();
        // Two full batches of 4 and a trailing batch of 2.
        stats.record(1.0, 4, 2);
        stats.record(0.5, 4, 3);
        stats.record(2.0, 2, 1);

        let expected = (1.0 * 4.0 + 0.5 * 4.0 + 2.0 * 2.0) / 10.0;
        assert!((stats.loss() - expected).abs() < 1e-12);
        assert_eq!(stats.total(), 10);
    }

    #[test]
    fn test_accuracy_is_exact_match_fraction() {
        let mut stats = EpochStats::new();
        stats.record(0.3, 8, 6);
        stats.record(0.3, 8, 8);

        assert!((stats.accuracy() - 14.0 / 16.0).abs() < 1e-12);
        assert!(stats.accuracy() >= 0.0 && stats.accuracy() <= 1.0);
    }

    #[test]
    fn test_empty_stats_are_zero() {
        let stats = EpochStats::new();
        assert_eq!(stats.loss(), 0.0);
        assert_eq!(stats.accuracy(), 0.0);
    }
}

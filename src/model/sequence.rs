//! Recurrent sequence classifier.
//!
//! A single-layer LSTM consumes the flattened spatial feature map as a
//! sequence of feature vectors and classifies from the final time step's
//! hidden output. Initial hidden and cell states are zero (Burn's `None`
//! state).

use burn::{
    config::Config,
    module::Module,
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Lstm, LstmConfig},
    tensor::{backend::Backend, Tensor},
};

/// Configuration for the sequence classifier
#[derive(Config, Debug)]
pub struct SequenceClassifierConfig {
    /// Per-step feature width; must equal the extractor's channel depth
    pub input_size: usize,

    /// LSTM hidden width
    #[config(default = "128")]
    pub hidden_size: usize,

    /// Number of output classes
    #[config(default = "2")]
    pub num_classes: usize,

    /// Dropout applied to the final hidden output
    #[config(default = "0.5")]
    pub dropout_rate: f64,
}

impl SequenceClassifierConfig {
    /// Initialize the classifier on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> SequenceClassifier<B> {
        let lstm = LstmConfig::new(self.input_size, self.hidden_size, true).init(device);
        let dropout = DropoutConfig::new(self.dropout_rate).init();
        let fc = LinearConfig::new(self.hidden_size, self.num_classes).init(device);

        SequenceClassifier { lstm, dropout, fc }
    }
}

/// LSTM over feature sequences, classifying from the last time step.
#[derive(Module, Debug)]
pub struct SequenceClassifier<B: Backend> {
    pub lstm: Lstm<B>,
    pub dropout: Dropout,
    pub fc: Linear<B>,
}

impl<B: Backend> SequenceClassifier<B> {
    /// Forward pass.
    ///
    /// Input `[B, T, F]` (batch-first), output logits `[B, num_classes]`.
    /// F must match the configured `input_size` or the LSTM's matmul panics
    /// with a dimension mismatch.
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let (out, _) = self.lstm.forward(x, None);

        let [batch_size, seq_len, hidden_size] = out.dims();
        let last = out
            .slice([0..batch_size, (seq_len - 1)..seq_len])
            .reshape([batch_size, hidden_size]);

        let last = self.dropout.forward(last);
        self.fc.forward(last)
    }
}

//! Combined model: frozen CNN features reshaped into an LSTM input sequence.
//!
//! The extractor's spatial map `[B, C, H, W]` is permuted channel-last and
//! flattened so spatial positions become sequence steps and channel depth
//! becomes the per-step feature vector: `[B, H*W, C]`. Features are detached,
//! so no gradient ever reaches the backbone.

use burn::{
    config::Config,
    module::Module,
    nn::{Dropout, DropoutConfig},
    tensor::{backend::Backend, Tensor},
};

use super::extractor::{FeatureExtractor, FeatureExtractorConfig};
use super::sequence::{SequenceClassifier, SequenceClassifierConfig};

/// Configuration for the combined classifier.
///
/// The sequence classifier's input width is derived from the extractor's
/// channel depth, so the two stages cannot be built inconsistently.
#[derive(Config, Debug)]
pub struct DeepfakeClassifierConfig {
    /// Feature extractor configuration
    pub extractor: FeatureExtractorConfig,

    /// LSTM hidden width
    #[config(default = "128")]
    pub hidden_size: usize,

    /// Number of output classes
    #[config(default = "2")]
    pub num_classes: usize,

    /// Dropout applied to the feature sequence before the LSTM
    #[config(default = "0.5")]
    pub dropout_rate: f64,
}

impl DeepfakeClassifierConfig {
    /// Initialize the combined model on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> DeepfakeClassifier<B> {
        let extractor = self.extractor.init(device);

        let sequence = SequenceClassifierConfig::new(self.extractor.feature_dim())
            .with_hidden_size(self.hidden_size)
            .with_num_classes(self.num_classes)
            .with_dropout_rate(self.dropout_rate)
            .init(device);

        let dropout = DropoutConfig::new(self.dropout_rate).init();

        DeepfakeClassifier {
            extractor,
            dropout,
            sequence,
        }
    }
}

/// End-to-end model from raw image batch to class logits.
#[derive(Module, Debug)]
pub struct DeepfakeClassifier<B: Backend> {
    pub extractor: FeatureExtractor<B>,
    pub dropout: Dropout,
    pub sequence: SequenceClassifier<B>,
}

impl<B: Backend> DeepfakeClassifier<B> {
    /// Forward pass: frozen feature extraction, sequence reshaping, then the
    /// recurrent classifier. Output is `[B, num_classes]` for any input
    /// resolution the backbone accepts.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        // Detached: the backbone receives no gradient signal.
        let features = self.extractor.forward_features(x).detach();

        // [B, C, H, W] -> [B, H, W, C] -> [B, H*W, C]
        let [batch_size, channels, height, width] = features.dims();
        let sequence = features
            .permute([0, 2, 3, 1])
            .reshape([batch_size, height * width, channels]);

        let sequence = self.dropout.forward(sequence);
        self.sequence.forward(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::tensor::Distribution;

    type TestBackend = burn::backend::NdArray;

    fn small_config() -> DeepfakeClassifierConfig {
        DeepfakeClassifierConfig::new(FeatureExtractorConfig::new().with_base_filters(4))
            .with_hidden_size(16)
    }

    #[test]
    fn test_output_shape_across_batch_sizes() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device);

        for batch_size in [1usize, 2, 5] {
            let input = Tensor::<TestBackend, 4>::random(
                [batch_size, 3, 32, 32],
                Distribution::Default,
                &device,
            );
            assert_eq!(model.forward(input).dims(), [batch_size, 2]);
        }
    }

    #[test]
    fn test_output_shape_across_resolutions() {
        let device = Default::default();
        let model = small_config().init::<TestBackend>(&device);

        // Different resolutions change the sequence length, not the logits.
        for size in [32usize, 48, 64] {
            let input = Tensor::<TestBackend, 4>::random(
                [2, 3, size, size],
                Distribution::Default,
                &device,
            );
            assert_eq!(model.forward(input).dims(), [2, 2]);
        }
    }

    #[test]
    fn test_forward_is_deterministic_without_autodiff() {
        // Dropout is inactive in valid mode, so repeated forwards with the
        // same weights and input must agree exactly.
        use burn::backend::Autodiff;
        use burn::module::AutodiffModule;

        let device = Default::default();
        let model = small_config().init::<Autodiff<TestBackend>>(&device);
        let inference = model.valid();

        let input =
            Tensor::<TestBackend, 4>::random([1, 3, 32, 32], Distribution::Default, &device);

        let a: Vec<f32> = inference
            .forward(input.clone())
            .into_data()
            .to_vec()
            .unwrap();
        let b: Vec<f32> = inference.forward(input).into_data().to_vec().unwrap();
        assert_eq!(a, b);
    }
}

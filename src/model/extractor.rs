//! Convolutional feature extractor.
//!
//! A compact backbone of four conv blocks whose output spatial map feeds the
//! sequence classifier. The original classifier head was replaced with a
//! two-layer feed-forward block (512 hidden units, ReLU, dropout 0.5 twice);
//! the head survives for checkpoint compatibility but the combined model
//! only calls `forward_features`.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
    },
    tensor::{backend::Backend, Tensor},
};

/// Configuration for the feature extractor
#[derive(Config, Debug)]
pub struct FeatureExtractorConfig {
    /// Number of output classes for the (vestigial) classifier head
    #[config(default = "2")]
    pub num_classes: usize,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,

    /// Base number of convolutional filters; channel depth grows to 8x this
    #[config(default = "32")]
    pub base_filters: usize,

    /// Hidden width of the classifier head
    #[config(default = "512")]
    pub head_hidden: usize,

    /// Dropout rate in the classifier head
    #[config(default = "0.5")]
    pub dropout_rate: f64,
}

impl FeatureExtractorConfig {
    /// Channel depth of the extracted feature map. The sequence classifier's
    /// input width must match this exactly.
    pub fn feature_dim(&self) -> usize {
        self.base_filters * 8
    }

    /// Initialize the extractor on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> FeatureExtractor<B> {
        let base = self.base_filters;

        // Each block halves the spatial dims: 224 -> 14 after four pools.
        let conv1 = ConvBlock::new(self.in_channels, base, 3, true, device);
        let conv2 = ConvBlock::new(base, base * 2, 3, true, device);
        let conv3 = ConvBlock::new(base * 2, base * 4, 3, true, device);
        let conv4 = ConvBlock::new(base * 4, base * 8, 3, true, device);

        let global_pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();

        let fc1 = LinearConfig::new(self.feature_dim(), self.head_hidden).init(device);
        let dropout1 = DropoutConfig::new(self.dropout_rate).init();
        let fc2 = LinearConfig::new(self.head_hidden, self.num_classes).init(device);
        let dropout2 = DropoutConfig::new(self.dropout_rate).init();

        FeatureExtractor {
            conv1,
            conv2,
            conv3,
            conv4,
            global_pool,
            fc1,
            dropout1,
            fc2,
            dropout2,
        }
    }
}

/// A conv block: Conv2d, BatchNorm, ReLU, and optional 2x2 MaxPool
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv: Conv2d<B>,
    pub bn: BatchNorm<B, 2>,
    pub relu: Relu,
    pub pool: Option<MaxPool2d>,
}

impl<B: Backend> ConvBlock<B> {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel_size: usize,
        with_pool: bool,
        device: &B::Device,
    ) -> Self {
        let conv = Conv2dConfig::new([in_channels, out_channels], [kernel_size, kernel_size])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        let bn = BatchNormConfig::new(out_channels).init(device);

        let pool = if with_pool {
            Some(MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init())
        } else {
            None
        };

        Self {
            conv,
            bn,
            relu: Relu::new(),
            pool,
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.bn.forward(x);
        let x = self.relu.forward(x);

        match &self.pool {
            Some(pool) => pool.forward(x),
            None => x,
        }
    }
}

/// Convolutional backbone with a replaced two-layer classifier head.
///
/// In the combined model only `forward_features` is called; the head is
/// loaded from a fine-tuned checkpoint and otherwise sits inert.
#[derive(Module, Debug)]
pub struct FeatureExtractor<B: Backend> {
    pub conv1: ConvBlock<B>,
    pub conv2: ConvBlock<B>,
    pub conv3: ConvBlock<B>,
    pub conv4: ConvBlock<B>,

    pub global_pool: AdaptiveAvgPool2d,

    pub fc1: Linear<B>,
    pub dropout1: Dropout,
    pub fc2: Linear<B>,
    pub dropout2: Dropout,
}

impl<B: Backend> FeatureExtractor<B> {
    /// Extract the spatial feature map.
    ///
    /// Input `[B, 3, H, W]`, output `[B, C, H/16, W/16]` where C is
    /// `feature_dim()` of the config that built this extractor.
    pub fn forward_features(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv1.forward(x);
        let x = self.conv2.forward(x);
        let x = self.conv3.forward(x);
        self.conv4.forward(x)
    }

    /// Full forward pass through backbone and classifier head.
    ///
    /// Returns logits `[B, num_classes]`. Unused by the combined model.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.forward_features(x);

        let x = self.global_pool.forward(x);
        let [batch_size, channels, _, _] = x.dims();
        let x = x.reshape([batch_size, channels]);

        let x = self.fc1.forward(x);
        let x = Relu::new().forward(x);
        let x = self.dropout1.forward(x);
        let x = self.fc2.forward(x);
        self.dropout2.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestBackend = burn::backend::NdArray;

    #[test]
    fn test_feature_map_shape() {
        let device = Default::default();
        let config = FeatureExtractorConfig::new();
        let model = config.init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 4>::zeros([2, 3, 64, 64], &device);
        let features = model.forward_features(input);

        // Four pooling stages: 64 -> 4 spatially, channels at base * 8.
        assert_eq!(features.dims(), [2, 256, 4, 4]);
    }

    #[test]
    fn test_head_logits_shape() {
        let device = Default::default();
        let config = FeatureExtractorConfig::new().with_base_filters(8);
        let model = config.init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 4>::zeros([3, 3, 32, 32], &device);
        let logits = model.forward(input);

        assert_eq!(logits.dims(), [3, 2]);
    }

    #[test]
    fn test_feature_dim_matches_channel_depth() {
        let config = FeatureExtractorConfig::new().with_base_filters(16);
        assert_eq!(config.feature_dim(), 128);

        let device = Default::default();
        let model = config.init::<TestBackend>(&device);
        let input = Tensor::<TestBackend, 4>::zeros([1, 3, 32, 32], &device);
        let features = model.forward_features(input);
        assert_eq!(features.dims()[1], config.feature_dim());
    }
}

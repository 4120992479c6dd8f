//! Model architectures: CNN feature extractor, LSTM sequence classifier,
//! and the combined two-stage deepfake classifier.

pub mod combined;
pub mod extractor;
pub mod sequence;

pub use combined::{DeepfakeClassifier, DeepfakeClassifierConfig};
pub use extractor::{ConvBlock, FeatureExtractor, FeatureExtractorConfig};
pub use sequence::{SequenceClassifier, SequenceClassifierConfig};

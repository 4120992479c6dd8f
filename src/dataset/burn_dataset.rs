//! Burn dataset and batcher for frame classification.
//!
//! Images are loaded lazily at batch time, resized to the fixed input size,
//! and normalized per channel with mean 0.5 / std 0.5, mapping pixel values
//! to roughly [-1, 1].

use std::path::PathBuf;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use image::imageops::FilterType;
use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::utils::error::{DeepframeError, Result};
use crate::IMAGE_SIZE;

/// A single frame ready for batching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameItem {
    /// Image data as flattened CHW float array [3 * H * W], values in [0, 1]
    pub image: Vec<f32>,
    /// Class label
    pub label: usize,
    /// Source path (for error reporting)
    pub path: String,
}

impl FrameItem {
    /// Load and preprocess an image: decode, resize to `image_size` square,
    /// convert to CHW floats in [0, 1]. A malformed file surfaces here, at
    /// batch materialization time.
    pub fn from_path(path: &PathBuf, label: usize, image_size: usize) -> Result<Self> {
        let img = ImageReader::open(path)
            .map_err(|e| DeepframeError::ImageLoad(path.clone(), e.to_string()))?
            .decode()
            .map_err(|e| DeepframeError::ImageLoad(path.clone(), e.to_string()))?
            .resize_exact(image_size as u32, image_size as u32, FilterType::Triangle)
            .to_rgb8();

        let (width, height) = (image_size, image_size);
        let mut image = vec![0.0f32; 3 * height * width];

        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x as u32, y as u32);
                image[y * width + x] = pixel[0] as f32 / 255.0;
                image[height * width + y * width + x] = pixel[1] as f32 / 255.0;
                image[2 * height * width + y * width + x] = pixel[2] as f32 / 255.0;
            }
        }

        Ok(Self {
            image,
            label,
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Create from pre-loaded image data
    pub fn from_data(image: Vec<f32>, label: usize, path: String) -> Self {
        Self { image, label, path }
    }
}

/// Frame dataset implementing Burn's `Dataset` trait with lazy image loading.
#[derive(Debug, Clone)]
pub struct FrameBurnDataset {
    samples: Vec<(PathBuf, usize)>,
    image_size: usize,
}

impl FrameBurnDataset {
    /// Create a new dataset from (path, label) pairs
    pub fn new(samples: Vec<(PathBuf, usize)>, image_size: usize) -> Self {
        Self {
            samples,
            image_size,
        }
    }

    /// Create from a scanned split, preserving scan order
    pub fn from_loader(loader: &super::loader::FrameDataset) -> Self {
        let samples: Vec<_> = loader
            .samples
            .iter()
            .map(|s| (s.path.clone(), s.label))
            .collect();

        Self::new(samples, IMAGE_SIZE)
    }

    /// Load one item, propagating decode failures.
    ///
    /// The training loop uses this instead of `Dataset::get` so a malformed
    /// image aborts the run at batch materialization time rather than being
    /// silently dropped.
    pub fn try_get(&self, index: usize) -> Result<FrameItem> {
        let (path, label) = self.samples.get(index).ok_or_else(|| {
            DeepframeError::Dataset(format!("index {} out of bounds", index))
        })?;
        FrameItem::from_path(path, *label, self.image_size)
    }
}

impl Dataset<FrameItem> for FrameBurnDataset {
    fn get(&self, index: usize) -> Option<FrameItem> {
        self.try_get(index).ok()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of frames for training or evaluation
#[derive(Clone, Debug)]
pub struct FrameBatch<B: Backend> {
    /// Images with shape [batch_size, 3, height, width], normalized
    pub images: Tensor<B, 4>,
    /// Labels with shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher that stacks frame items into normalized tensors
#[derive(Clone, Debug)]
pub struct FrameBatcher {
    image_size: usize,
}

impl FrameBatcher {
    pub fn new() -> Self {
        Self {
            image_size: IMAGE_SIZE,
        }
    }

    pub fn with_image_size(image_size: usize) -> Self {
        Self { image_size }
    }
}

impl Default for FrameBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Batcher<B, FrameItem, FrameBatch<B>> for FrameBatcher {
    fn batch(&self, items: Vec<FrameItem>, device: &B::Device) -> FrameBatch<B> {
        let batch_size = items.len();
        let channels = 3;
        let height = self.image_size;
        let width = self.image_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();

        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, channels, height, width]),
            device,
        );

        // Per-channel normalization with mean 0.5 and std 0.5: [0, 1] -> [-1, 1].
        let images = (images - 0.5) / 0.5;

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets =
            Tensor::<B, 1, Int>::from_data(TensorData::new(targets_data, [batch_size]), device);

        FrameBatch { images, targets }
    }
}

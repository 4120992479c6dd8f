//! Frame dataset loader.
//!
//! Scans one split directory (training, validation, or testing) whose
//! immediate subdirectories are class labels, e.g.:
//!
//! ```text
//! training_set/
//! ├── deepfake/
//! │   ├── frame_0001.jpg
//! │   └── frame_0002.jpg
//! └── real/
//!     └── frame_0001.jpg
//! ```
//!
//! Class names are sorted before label assignment, so label indices are
//! stable across splits and runs. Every sample's label comes from the
//! directory it lives under.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::utils::error::{DeepframeError, Result};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// A single frame sample: image path plus the label inferred from its
/// parent class directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label index
    pub label: usize,
    /// Class name (e.g., "deepfake")
    pub class_name: String,
}

/// A split of the frame dataset, scanned eagerly but loading image bytes
/// lazily at batch time.
#[derive(Debug)]
pub struct FrameDataset {
    /// Root directory of this split
    pub root_dir: PathBuf,
    /// All samples in directory-scan order
    pub samples: Vec<FrameSample>,
    /// Mapping from class name to label index
    pub class_to_idx: HashMap<String, usize>,
}

impl FrameDataset {
    /// Scan a split directory, failing fast when it is missing or holds no
    /// image files.
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        info!("Scanning frame dataset at {:?}", root_dir);

        if !root_dir.exists() {
            return Err(DeepframeError::PathNotFound(root_dir));
        }

        let mut class_dirs: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&root_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    class_dirs.push(name.to_string());
                }
            }
        }
        class_dirs.sort();

        if class_dirs.is_empty() {
            return Err(DeepframeError::Dataset(format!(
                "no class directories under {:?}",
                root_dir
            )));
        }

        let class_to_idx: HashMap<String, usize> = class_dirs
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        let mut samples = Vec::new();
        for class_name in &class_dirs {
            let class_dir = root_dir.join(class_name);
            let label = class_to_idx[class_name];

            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path().to_path_buf();
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        samples.push(FrameSample {
                            path,
                            label,
                            class_name: class_name.clone(),
                        });
                    }
                }
            }

            debug!("Class '{}' mapped to label {}", class_name, label);
        }

        if samples.is_empty() {
            return Err(DeepframeError::Dataset(format!(
                "no image files under {:?}",
                root_dir
            )));
        }

        info!(
            "Loaded {} samples across {} classes",
            samples.len(),
            class_dirs.len()
        );

        Ok(Self {
            root_dir,
            samples,
            class_to_idx,
        })
    }

    /// Number of samples in this split
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the split holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of discovered classes
    pub fn num_classes(&self) -> usize {
        self.class_to_idx.len()
    }

    /// Samples per class, indexed by label
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.num_classes()];
        for sample in &self.samples {
            counts[sample.label] += 1;
        }
        counts
    }
}

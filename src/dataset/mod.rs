//! Dataset handling for pre-extracted video frames.
//!
//! Frames live under a fixed layout rooted at the data directory:
//!
//! ```text
//! <data_dir>/frames/classified sets/
//! ├── training_set/{class}/...
//! ├── validation_set/{class}/...
//! └── testing_set/{class}/...
//! ```
//!
//! The training loader shuffles per epoch; validation and testing iterate in
//! directory-scan order.

use std::path::{Path, PathBuf};

pub mod burn_dataset;
pub mod loader;

pub use burn_dataset::{FrameBatch, FrameBatcher, FrameBurnDataset, FrameItem};
pub use loader::{FrameDataset, FrameSample};

/// Split directory names under the classified-sets root
pub const TRAINING_SET: &str = "training_set";
pub const VALIDATION_SET: &str = "validation_set";
pub const TESTING_SET: &str = "testing_set";

/// Resolve the classified-sets root inside a data directory
pub fn classified_sets_root(data_dir: &Path) -> PathBuf {
    data_dir.join("frames").join("classified sets")
}

/// Resolve the (train, validation, test) split directories for a data root
pub fn split_dirs(data_dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let root = classified_sets_root(data_dir);
    (
        root.join(TRAINING_SET),
        root.join(VALIDATION_SET),
        root.join(TESTING_SET),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dirs_layout() {
        let (train, val, test) = split_dirs(Path::new("/data"));
        assert_eq!(
            train,
            Path::new("/data/frames/classified sets/training_set")
        );
        assert_eq!(
            val,
            Path::new("/data/frames/classified sets/validation_set")
        );
        assert_eq!(test, Path::new("/data/frames/classified sets/testing_set"));
    }
}

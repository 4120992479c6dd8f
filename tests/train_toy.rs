//! End-to-end training on a synthetic toy dataset.

use std::fs;
use std::path::Path;

use burn::backend::{Autodiff, NdArray};
use burn::module::{AutodiffModule, Module};
use burn::record::CompactRecorder;
use burn::tensor::{Distribution, Tensor};
use image::{Rgb, RgbImage};

use deepframe::model::{DeepfakeClassifierConfig, FeatureExtractorConfig};
use deepframe::training::{run_training, TrainSettings};

type TestBackend = NdArray;
type TrainBackend = Autodiff<NdArray>;

fn write_frame(dir: &Path, name: &str, shade: u8) {
    let mut img = RgbImage::new(32, 32);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        // Slight gradient so frames within a class are not identical.
        *pixel = Rgb([shade, (x as u8).wrapping_add(shade), y as u8]);
    }
    img.save(dir.join(name)).unwrap();
}

/// Lay out `frames/classified sets/{training_set, validation_set}` with two
/// classes: 2 training frames per class, 1 validation frame per class.
fn write_toy_dataset(root: &Path) {
    let sets = root.join("frames").join("classified sets");
    for (split, per_class) in [("training_set", 2usize), ("validation_set", 1usize)] {
        for class in ["deepfake", "real"] {
            let dir = sets.join(split).join(class);
            fs::create_dir_all(&dir).unwrap();
            let shade = if class == "deepfake" { 40 } else { 200 };
            for i in 0..per_class {
                write_frame(&dir, &format!("frame_{:04}.png", i), shade);
            }
        }
    }
}

fn small_model() -> DeepfakeClassifierConfig {
    DeepfakeClassifierConfig::new(FeatureExtractorConfig::new().with_base_filters(4))
        .with_hidden_size(16)
}

#[test]
fn toy_run_completes_and_checkpoints_once() {
    let temp = tempfile::tempdir().unwrap();
    let data_dir = temp.path().join("data");
    let output_dir = temp.path().join("output");
    write_toy_dataset(&data_dir);

    let mut settings = TrainSettings::new(&data_dir, &output_dir);
    settings.epochs = 1;
    settings.batch_size = 2;
    settings.model = small_model();

    let device = Default::default();
    let report = run_training::<TrainBackend>(&settings, &device).unwrap();

    assert_eq!(report.epochs.len(), 1);

    // Epoch 1's validation loss is trivially the best so far, so exactly one
    // best checkpoint is written.
    let epoch = &report.epochs[0];
    assert!(epoch.is_best);
    assert!(report.best_checkpoint.is_some());
    assert!(output_dir.join("model_best.mpk").exists());

    // The terminal write persists the extractor state alone.
    assert!(output_dir.join("model.mpk").exists());

    // Accuracy is an exact-match fraction.
    assert!(epoch.val_accuracy >= 0.0 && epoch.val_accuracy <= 1.0);
    assert!(epoch.train_accuracy >= 0.0 && epoch.train_accuracy <= 1.0);
    assert!(epoch.val_loss.is_finite());
}

#[test]
fn missing_training_split_fails_before_training() {
    let temp = tempfile::tempdir().unwrap();
    let data_dir = temp.path().join("data");
    let output_dir = temp.path().join("output");
    // No dataset written at all.

    let mut settings = TrainSettings::new(&data_dir, &output_dir);
    settings.epochs = 1;
    settings.model = small_model();

    let device = Default::default();
    assert!(run_training::<TrainBackend>(&settings, &device).is_err());
}

#[test]
fn checkpoint_round_trip_reproduces_logits() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("combined");

    let device = Default::default();
    let model = small_model().init::<TrainBackend>(&device);

    let recorder = CompactRecorder::new();
    model.clone().save_file(&path, &recorder).unwrap();

    let reloaded = small_model()
        .init::<TrainBackend>(&device)
        .load_file(&path, &recorder, &device)
        .unwrap();

    let input =
        Tensor::<TestBackend, 4>::random([2, 3, 32, 32], Distribution::Default, &device);

    // Dropout disabled via valid(): identical weights must give identical
    // logits.
    let original: Vec<f32> = model
        .valid()
        .forward(input.clone())
        .into_data()
        .to_vec()
        .unwrap();
    let restored: Vec<f32> = reloaded
        .valid()
        .forward(input)
        .into_data()
        .to_vec()
        .unwrap();

    assert_eq!(original, restored);
}

#[test]
fn resume_from_absent_checkpoint_fails_at_load() {
    let temp = tempfile::tempdir().unwrap();
    let data_dir = temp.path().join("data");
    let output_dir = temp.path().join("output");
    write_toy_dataset(&data_dir);

    let mut settings = TrainSettings::new(&data_dir, &output_dir);
    settings.epochs = 1;
    settings.batch_size = 2;
    settings.model = small_model();
    settings.combined_checkpoint = Some(temp.path().join("no_such_checkpoint"));

    let device = Default::default();
    let result = run_training::<TrainBackend>(&settings, &device);
    assert!(result.is_err());

    // The failure happens before training starts: nothing was written.
    assert!(!output_dir.join("model_best.mpk").exists());
    assert!(!output_dir.join("model.mpk").exists());
}

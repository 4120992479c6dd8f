//! deepframe CLI
//!
//! Trains the two-stage deepfake frame classifier and reports dataset
//! statistics. All configuration is passed on the command line; there are no
//! environment variables.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use deepframe::backend::{backend_name, default_device, TrainingBackend};
use deepframe::dataset::{split_dirs, FrameDataset};
use deepframe::training::TrainSettings;
use deepframe::utils::logging::{init_logging, LogConfig};

/// Deepfake frame classification with a frozen CNN and an LSTM head
#[derive(Parser, Debug)]
#[command(name = "deepframe")]
#[command(version = deepframe::VERSION)]
#[command(about = "Train a CNN->LSTM deepfake frame classifier with Burn", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the combined classifier
    Train {
        /// Data root containing frames/classified sets/{training_set,...}
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Output directory for checkpoints
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Number of training epochs
        #[arg(short, long, default_value = "5")]
        epochs: usize,

        /// Batch size
        #[arg(short, long, default_value = "32")]
        batch_size: usize,

        /// Learning rate
        #[arg(short, long, default_value = "0.001")]
        learning_rate: f64,

        /// Random seed for epoch shuffling
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Pre-trained extractor checkpoint (backbone + fine-tuned head)
        #[arg(long)]
        extractor_checkpoint: Option<PathBuf>,

        /// Combined-model checkpoint to resume from
        #[arg(long)]
        combined_checkpoint: Option<PathBuf>,
    },

    /// Show statistics for all three dataset splits
    Stats {
        /// Data root containing frames/classified sets/{training_set,...}
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Train {
            data_dir,
            output_dir,
            epochs,
            batch_size,
            learning_rate,
            seed,
            extractor_checkpoint,
            combined_checkpoint,
        } => {
            // Device placement is decided once here and fixed for the run.
            println!("Using backend: {}", backend_name());

            let mut settings = TrainSettings::new(data_dir, output_dir);
            settings.epochs = epochs;
            settings.batch_size = batch_size;
            settings.learning_rate = learning_rate;
            settings.seed = seed;
            settings.extractor_checkpoint = extractor_checkpoint;
            settings.combined_checkpoint = combined_checkpoint;

            let device = default_device();
            let report =
                deepframe::training::run_training::<TrainingBackend>(&settings, &device)?;

            println!(
                "{} best validation loss {:.4}",
                "Done:".green().bold(),
                report.best_val_loss
            );
            if let Some(path) = report.best_checkpoint {
                println!("  Best checkpoint: {:?}", path);
            }
            println!("  Extractor state: {:?}", report.extractor_checkpoint);
        }

        Commands::Stats { data_dir } => {
            let (train_dir, val_dir, test_dir) = split_dirs(&data_dir);

            for (name, dir) in [
                ("training_set", train_dir),
                ("validation_set", val_dir),
                ("testing_set", test_dir),
            ] {
                match FrameDataset::new(&dir) {
                    Ok(dataset) => {
                        println!("{}", name.cyan().bold());
                        let mut classes: Vec<_> = dataset.class_to_idx.iter().collect();
                        classes.sort_by_key(|(_, idx)| **idx);
                        let counts = dataset.class_counts();
                        for (class_name, idx) in classes {
                            println!("  {:2}. {:20} {:6}", idx, class_name, counts[*idx]);
                        }
                        println!("  total: {}", dataset.len());
                    }
                    Err(e) => {
                        println!("{} {}: {}", "Error:".red(), name, e);
                    }
                }
            }
        }
    }

    Ok(())
}

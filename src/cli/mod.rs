// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, using the `clap` crate
// to parse command line arguments. All business logic is
// delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — fine-tunes the classifier on a CSV table
//   2. `evaluate` — runs a checkpoint over a CSV table and
//                   writes predictions

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "text-classifier",
    version,
    about = "Fine-tune a transformer text classifier on CSV data, then evaluate it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use
    /// case. The CLI layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on '{}'", args.data);

        // CLI args → application config, so Layer 2 never sees clap types
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(
            args.data,
            args.checkpoint_dir,
            args.output,
        );
        use_case.execute()
    }
}

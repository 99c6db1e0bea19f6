// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and all
// their configurable flags. clap's derive macros generate the
// help text, error messages, and type conversions.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::domain::strategy::FineTuneStrategy;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the classifier on a labelled CSV table
    Train(TrainArgs),

    /// Evaluate a trained checkpoint against a CSV table
    Evaluate(EvaluateArgs),
}

/// CLI-facing mirror of the domain FineTuneStrategy, so the
/// domain layer stays free of clap derives.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    /// Update every parameter
    Full,
    /// Freeze the encoder; train the classification head only
    HeadOnly,
}

impl From<StrategyArg> for FineTuneStrategy {
    fn from(a: StrategyArg) -> Self {
        match a {
            StrategyArg::Full     => FineTuneStrategy::Full,
            StrategyArg::HeadOnly => FineTuneStrategy::HeadOnly,
        }
    }
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with `text` and `label` columns
    #[arg(long, default_value = "data/train.csv")]
    pub data: String,

    /// Directory for checkpoints, tokenizer, and label dictionary
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Maximum number of tokens per input sequence;
    /// shorter texts are padded, longer ones truncated
    #[arg(long, default_value_t = 192)]
    pub max_seq_len: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 3)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Random seed for the shuffle/split — same seed, same split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows used for training; the rest validate
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Total number of unique tokens in the built vocabulary
    #[arg(long, default_value_t = 8000)]
    pub vocab_size: usize,

    /// Hidden dimension of the transformer (d_model)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads; d_model must be divisible by this
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Which parameters to fine-tune
    #[arg(long, value_enum, default_value_t = StrategyArg::Full)]
    pub strategy: StrategyArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data,
            checkpoint_dir: a.checkpoint_dir,
            max_seq_len:    a.max_seq_len,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            seed:           a.seed,
            train_fraction: a.train_fraction,
            vocab_size:     a.vocab_size,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            strategy:       a.strategy.into(),
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// CSV file to evaluate; the `label` column is optional
    #[arg(long, default_value = "data/test.csv")]
    pub data: String,

    /// Directory where `train` saved its artefacts
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Where to write the table with the added prediction column
    #[arg(long, default_value = "data/result.csv")]
    pub output: String,
}

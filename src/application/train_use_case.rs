// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CSV rows           (Layer 4 - data)
//   Step 2: Clean the text              (Layer 4 - data)
//   Step 3: Build the label dictionary  (Layer 3 - domain)
//   Step 4: Persist the dictionary      (Layer 6 - infra)
//   Step 5: Build / load tokenizer      (Layer 6 - infra)
//   Step 6: Split train/validation      (Layer 4 - data)
//   Step 7: Build datasets              (Layer 4 - data)
//   Step 8: Save config                 (Layer 6 - infra)
//   Step 9: Run training loop           (Layer 5 - ml)
//
// Every step is fatal on failure; a run that cannot load its
// data or resolve its labels stops before the first batch.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::ClassDataset,
    loader::CsvLoader,
    preprocessor::Preprocessor,
    splitter::split_train_val,
};
use crate::domain::example::Example;
use crate::domain::label_dict::LabelDict;
use crate::domain::strategy::FineTuneStrategy;
use crate::domain::traits::ExampleSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    label_store::LabelStore,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run, in one place instead
// of scattered top-level mutable globals. Serialisable so it can
// be saved next to the checkpoint and reloaded for evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub checkpoint_dir: String,
    pub max_seq_len:    usize,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub seed:           u64,
    pub train_fraction: f64,
    pub vocab_size:     usize,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub strategy:       FineTuneStrategy,
}

impl TrainConfig {
    /// Reject values that cannot yield both a training and a
    /// validation partition. A fraction of exactly 0 or 1 would
    /// leave one side empty and its epoch losses undefined.
    pub fn validate(&self) -> Result<()> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            bail!(
                "train_fraction must be strictly between 0 and 1, got {}",
                self.train_fraction
            );
        }
        Ok(())
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      "data/train.csv".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            max_seq_len:    192,
            batch_size:     32,
            epochs:         3,
            lr:             1e-4,
            seed:           42,
            train_fraction: 0.8,
            vocab_size:     8000,
            d_model:        256,
            num_heads:      8,
            num_layers:     6,
            d_ff:           1024,
            dropout:        0.1,
            strategy:       FineTuneStrategy::Full,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load the training table ──────────────────────────────────
        tracing::info!("Loading training data from '{}'", cfg.data_path);
        let raw = CsvLoader::new(&cfg.data_path).load_all()?;
        if raw.is_empty() {
            bail!("training file '{}' contains no rows", cfg.data_path);
        }

        // ── Step 2: Clean cell text ───────────────────────────────────────────
        let preprocessor = Preprocessor::new();
        let examples: Vec<Example> = raw
            .into_iter()
            .map(|e| Example {
                text:  preprocessor.clean(&e.text),
                label: e.label,
            })
            .collect();

        // ── Step 3: Build the label dictionary ────────────────────────────────
        // Ids follow first appearance in the training file. A row
        // without a label is a data error, not something to skip.
        let mut labels = Vec::with_capacity(examples.len());
        for (i, example) in examples.iter().enumerate() {
            match example.label.as_deref() {
                Some(label) => labels.push(label),
                None => bail!("row {} of '{}' has no label", i + 1, cfg.data_path),
            }
        }
        let label_dict = LabelDict::build(labels)?;
        tracing::info!("Label dictionary: {} classes", label_dict.len());

        // ── Step 4: Persist the dictionary for evaluation ─────────────────────
        LabelStore::new(&cfg.checkpoint_dir).save(&label_dict)?;

        // ── Step 5: Build / load tokenizer ────────────────────────────────────
        let texts: Vec<String> = examples.iter().map(|e| e.text.clone()).collect();
        let tokenizer = TokenizerStore::new(&cfg.checkpoint_dir)
            .load_or_build(&texts, cfg.vocab_size)?;

        // ── Step 6: Seeded train/validation split ─────────────────────────────
        let (train_examples, val_examples) =
            split_train_val(examples, cfg.train_fraction, cfg.seed);
        if train_examples.is_empty() || val_examples.is_empty() {
            bail!(
                "split left a partition empty ({} train, {} validation) — \
                 '{}' needs more rows for train_fraction {}",
                train_examples.len(), val_examples.len(),
                cfg.data_path, cfg.train_fraction
            );
        }
        tracing::info!(
            "Split: {} train, {} validation",
            train_examples.len(),
            val_examples.len()
        );

        // ── Step 7: Build datasets ────────────────────────────────────────────
        let train_dataset = ClassDataset::labelled(
            &train_examples, &label_dict, tokenizer.clone(), cfg.max_seq_len,
        )?;
        let val_dataset = ClassDataset::labelled(
            &val_examples, &label_dict, tokenizer, cfg.max_seq_len,
        )?;

        // ── Step 8: Save config so evaluation can rebuild the model ───────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 9: Run the training loop (Layer 5) ───────────────────────────
        let metrics_logger = MetricsLogger::new(&cfg.checkpoint_dir)?;
        run_training(
            cfg,
            label_dict.len(),
            train_dataset,
            val_dataset,
            ckpt_manager,
            metrics_logger,
        )?;

        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_fraction(train_fraction: f64) -> TrainConfig {
        TrainConfig { train_fraction, ..TrainConfig::default() }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn degenerate_fractions_are_rejected() {
        // 1.0 would leave validation empty, 0.0 would leave
        // training empty; both must fail before any data loads
        assert!(config_with_fraction(1.0).validate().is_err());
        assert!(config_with_fraction(0.0).validate().is_err());
        assert!(config_with_fraction(1.5).validate().is_err());
        assert!(config_with_fraction(-0.2).validate().is_err());
    }

    #[test]
    fn interior_fractions_are_accepted() {
        assert!(config_with_fraction(0.5).validate().is_ok());
        assert!(config_with_fraction(0.99).validate().is_ok());
    }
}

// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV file to tensor batches.
//
// The pipeline flows in this order:
//
//   train.csv
//       │
//       ▼
//   CsvLoader         → reads rows into Examples
//       │
//       ▼
//   Preprocessor      → cleans cell text
//       │
//       ▼
//   split_train_val   → seeded shuffle + split
//       │
//       ▼
//   ClassDataset      → tokenises on access, resolves labels
//       │
//       ▼
//   ClassBatcher      → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step, so each
// step is independently testable.

/// Loads examples from a headered CSV file
pub mod loader;

/// Cleans and normalises raw cell text
pub mod preprocessor;

/// Implements Burn's Dataset trait for classification samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;

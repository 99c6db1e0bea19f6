// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Loads the input table using the csv crate.
//
// Expected layout: a headered CSV with a `text` column and,
// for training data, a `label` column. Extra columns are
// ignored. The `label` column may be absent entirely — that
// is how unlabelled evaluation tables arrive.
//
// Any I/O or parse failure here is fatal: there is no notion
// of partially-loaded training data.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::example::Example;
use crate::domain::traits::ExampleSource;

/// One raw CSV row, before it becomes a domain Example.
/// `label` is defaulted so tables without that column still
/// deserialise cleanly.
#[derive(Debug, Deserialize)]
struct RawRow {
    text: String,
    #[serde(default)]
    label: Option<String>,
}

/// Loads all rows of a single CSV file.
/// Implements the ExampleSource trait from Layer 3.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl ExampleSource for CsvLoader {
    fn load_all(&self) -> Result<Vec<Example>> {
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("cannot open CSV file '{}'", self.path.display()))?;

        let mut examples = Vec::new();
        for (i, row) in reader.deserialize::<RawRow>().enumerate() {
            // Row numbers in the message are 1-based and skip the header
            let row = row.with_context(|| {
                format!("malformed row {} in '{}'", i + 1, self.path.display())
            })?;
            examples.push(Example { text: row.text, label: row.label });
        }

        tracing::info!(
            "Loaded {} rows from '{}'",
            examples.len(),
            self.path.display()
        );
        Ok(examples)
    }
}

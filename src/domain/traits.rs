// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits instead
// of concrete loader types, so a different tabular format can
// be swapped in without touching the training pipeline.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::example::Example;

// ─── ExampleSource ────────────────────────────────────────────────────────────
/// Any component that can load (text, label) examples.
///
/// Implementations:
///   - CsvLoader → loads from a headered CSV file
///   - (future) a loader for other spreadsheet formats
pub trait ExampleSource {
    /// Load every example from this source.
    /// A missing or malformed source is a fatal error — the run
    /// aborts before any training step happens.
    fn load_all(&self) -> Result<Vec<Example>>;
}

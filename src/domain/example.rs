// ============================================================
// Layer 3 — Example Domain Type
// ============================================================
// One row of the input table: a raw text and its category label.
// By the time an Example exists, all file-format concerns have
// already been handled by the data layer.
//
// The label is optional because evaluation accepts tables
// without a ground-truth column — predictions are still
// produced, accuracy simply cannot be computed.

use serde::{Deserialize, Serialize};

/// A single (text, label) pair read from the input table.
/// Immutable once constructed; discarded after tokenisation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    /// The raw text to classify
    pub text: String,

    /// The category label string, if the source table carries one
    pub label: Option<String>,
}

impl Example {
    /// Create a labelled example.
    /// Uses impl Into<String> so callers can pass &str or String.
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: Some(label.into()),
        }
    }

    /// Create an example without a ground-truth label
    pub fn unlabelled(text: impl Into<String>) -> Self {
        Self {
            text:  text.into(),
            label: None,
        }
    }
}

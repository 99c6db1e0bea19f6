// ============================================================
// Layer 3 — Fine-tune Strategy
// ============================================================
// Which parameters the optimiser is allowed to update.
//
// Selected once at startup from the CLI and dispatched at a
// single point (model construction) instead of branching on
// boolean mode flags throughout the training code.
//
// Parameter-efficient schemes that inject extra modules
// (adapters, quantised adapters) belong to the modelling
// library and would plug into this same seam.

use serde::{Deserialize, Serialize};

/// How much of the model a training run fine-tunes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FineTuneStrategy {
    /// Update every parameter — embeddings, encoder, and head
    Full,

    /// Freeze the encoder; only the classification head learns.
    /// Much cheaper per step, useful when the dataset is tiny.
    HeadOnly,
}

impl FineTuneStrategy {
    /// True if the encoder should not receive gradients
    pub fn freezes_encoder(self) -> bool {
        matches!(self, Self::HeadOnly)
    }
}

impl std::fmt::Display for FineTuneStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full     => write!(f, "full"),
            Self::HeadOnly => write!(f, "head_only"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_only_freezes_encoder() {
        assert!(!FineTuneStrategy::Full.freezes_encoder());
        assert!(FineTuneStrategy::HeadOnly.freezes_encoder());
    }
}

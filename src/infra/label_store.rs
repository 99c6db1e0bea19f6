// ============================================================
// Layer 6 — Label Dictionary Store
// ============================================================
// Persists the label dictionary as a plain JSON object of
// label-string → integer-id pairs:
//
//   { "economy": 0, "sports": 1, "politics": 2 }
//
// Training writes this once, right after building the
// dictionary; evaluation loads it read-only. Loading validates
// the bijectivity invariant (dense ids 0..n, no duplicates)
// so a hand-edited or truncated file fails loudly instead of
// silently shifting every prediction by one class.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::label_dict::LabelDict;

pub struct LabelStore {
    dir: PathBuf,
}

impl LabelStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    fn file_path(&self) -> PathBuf {
        self.dir.join("label_dict.json")
    }

    /// Write the dictionary as a label → id JSON map.
    pub fn save(&self, dict: &LabelDict) -> Result<()> {
        std::fs::create_dir_all(&self.dir).ok();

        let entries: HashMap<&str, usize> = dict.entries().collect();
        let path = self.file_path();
        std::fs::write(&path, serde_json::to_string_pretty(&entries)?)
            .with_context(|| format!("cannot write label dictionary to '{}'", path.display()))?;

        tracing::info!("Saved {} labels to '{}'", dict.len(), path.display());
        Ok(())
    }

    /// Load and validate a previously saved dictionary.
    pub fn load(&self) -> Result<LabelDict> {
        let path = self.file_path();
        let json = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "cannot read label dictionary from '{}'. \
                 Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;

        let entries: HashMap<String, usize> = serde_json::from_str(&json)
            .with_context(|| format!("malformed label dictionary '{}'", path.display()))?;

        LabelDict::from_entries(entries)
            .with_context(|| format!("invalid label dictionary '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> (LabelStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "text-classifier-labels-{}-{}",
            name,
            std::process::id()
        ));
        (LabelStore::new(dir.to_str().unwrap().to_string()), dir)
    }

    #[test]
    fn save_then_load_is_identity() {
        let (store, dir) = temp_store("round-trip");
        let dict = LabelDict::build(["a", "b", "a", "c"]).unwrap();

        store.save(&dict).unwrap();
        let loaded = store.load().unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loaded, dict);
        assert_eq!(loaded.lookup("a").unwrap(), 0);
        assert_eq!(loaded.lookup("b").unwrap(), 1);
        assert_eq!(loaded.lookup("c").unwrap(), 2);
    }

    #[test]
    fn loading_from_an_untrained_dir_fails() {
        let (store, dir) = temp_store("missing");
        std::fs::remove_dir_all(&dir).ok();
        assert!(store.load().is_err());
    }

    #[test]
    fn corrupt_file_fails_validation() {
        let (store, dir) = temp_store("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        // ids 0 and 2 with a gap — violates the density invariant
        std::fs::write(dir.join("label_dict.json"), r#"{"a": 0, "b": 2}"#).unwrap();

        let result = store.load();
        std::fs::remove_dir_all(&dir).ok();
        assert!(result.is_err());
    }
}

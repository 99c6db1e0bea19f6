// ============================================================
// Layer 3 — Label Dictionary
// ============================================================
// A stable, bijective mapping from category label strings to
// dense integer ids used as model targets.
//
// Invariants:
//   - ids are assigned 0, 1, 2, ... in order of FIRST appearance
//     in the training data
//   - every label seen at train or eval time must be present,
//     otherwise lookup fails
//   - never mutated after build; evaluation loads it read-only
//
// The id order matters: the model's output layer has one logit
// per id, so the dictionary persisted at training time must be
// byte-for-byte the one used at evaluation time.

use std::collections::HashMap;

use anyhow::{bail, Result};

/// Bijective label-string → dense-id mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDict {
    /// id → label, in insertion order (index IS the id)
    labels: Vec<String>,

    /// label → id, for O(1) lookup
    index: HashMap<String, usize>,
}

impl LabelDict {
    /// Build a dictionary from a sequence of label strings.
    /// Duplicates are fine — each distinct label gets the next
    /// free id the first time it appears.
    ///
    /// Fails if the sequence contains no labels at all.
    pub fn build<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self {
            labels: Vec::new(),
            index:  HashMap::new(),
        };

        for label in labels {
            let label = label.as_ref();
            if !dict.index.contains_key(label) {
                dict.index.insert(label.to_string(), dict.labels.len());
                dict.labels.push(label.to_string());
            }
        }

        if dict.labels.is_empty() {
            bail!("cannot build a label dictionary from an empty label set");
        }
        Ok(dict)
    }

    /// Rebuild a dictionary from an exact label → id mapping,
    /// e.g. one deserialised from disk.
    ///
    /// Validates the bijectivity invariant: ids must be exactly
    /// 0..n with no gaps and no duplicates.
    pub fn from_entries(entries: HashMap<String, usize>) -> Result<Self> {
        if entries.is_empty() {
            bail!("label dictionary is empty");
        }

        let mut labels = vec![None; entries.len()];
        for (label, &id) in &entries {
            match labels.get_mut(id) {
                Some(slot @ None) => *slot = Some(label.clone()),
                Some(_) => bail!("label dictionary has two labels with id {id}"),
                None => bail!(
                    "label id {id} is out of range for {} labels — ids must be dense",
                    entries.len()
                ),
            }
        }

        // Every slot is filled: n distinct in-range ids over n slots
        let labels: Vec<String> = labels.into_iter().flatten().collect();
        Ok(Self { labels, index: entries })
    }

    /// Resolve a label string to its dense id.
    /// Fails if the label was never seen during build — an unseen
    /// label at evaluation time means the persisted dictionary
    /// does not match the data, which is fatal (not recoverable).
    pub fn lookup(&self, label: &str) -> Result<usize> {
        self.index.get(label).copied().ok_or_else(|| {
            anyhow::anyhow!(
                "label '{label}' is not in the dictionary ({} known labels)",
                self.labels.len()
            )
        })
    }

    /// The label string for a dense id, if the id is in range
    pub fn label_of(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Number of distinct labels — this is the model's class count
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate (label, id) pairs in id order, for persistence
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().enumerate().map(|(id, l)| (l.as_str(), id))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigns_ids_in_first_appearance_order() {
        let dict = LabelDict::build(["a", "b", "a", "c"]).unwrap();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.lookup("a").unwrap(), 0);
        assert_eq!(dict.lookup("b").unwrap(), 1);
        assert_eq!(dict.lookup("c").unwrap(), 2);
    }

    #[test]
    fn lookup_is_inverse_of_label_of() {
        let dict = LabelDict::build(["sports", "politics", "economy"]).unwrap();
        for id in 0..dict.len() {
            let label = dict.label_of(id).unwrap();
            assert_eq!(dict.lookup(label).unwrap(), id);
        }
    }

    #[test]
    fn unseen_label_fails() {
        let dict = LabelDict::build(["a", "b", "a", "c"]).unwrap();
        assert!(dict.lookup("d").is_err());
    }

    #[test]
    fn empty_label_set_fails() {
        let labels: Vec<&str> = Vec::new();
        assert!(LabelDict::build(labels).is_err());
    }

    #[test]
    fn from_entries_round_trip() {
        let dict = LabelDict::build(["x", "y", "z"]).unwrap();
        let entries: HashMap<String, usize> = dict
            .entries()
            .map(|(l, id)| (l.to_string(), id))
            .collect();
        let rebuilt = LabelDict::from_entries(entries).unwrap();
        assert_eq!(rebuilt, dict);
    }

    #[test]
    fn from_entries_rejects_sparse_ids() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), 0);
        entries.insert("b".to_string(), 2); // gap at 1
        assert!(LabelDict::from_entries(entries).is_err());
    }

    #[test]
    fn from_entries_rejects_duplicate_ids() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), 0);
        entries.insert("b".to_string(), 0);
        assert!(LabelDict::from_entries(entries).is_err());
    }
}

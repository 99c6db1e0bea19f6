// ============================================================
// Layer 4 — Classification Dataset Adapter
// ============================================================
// A fixed-length random-access view over (text, label id)
// pairs, suitable for batched consumption.
//
// Tokenisation happens on each access: encode(index) turns one
// raw text into a fixed-length id/mask pair. Label resolution
// through the LabelDict happens once, at construction — an
// unseen label is a fatal error before the first batch is ever
// produced, not a surprise mid-epoch.
//
// Invariant: every sample has input_ids and attention_mask of
// length exactly max_seq_len. Shorter texts are right-padded,
// longer texts are truncated.

use anyhow::{anyhow, bail, Context, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::domain::example::Example;
use crate::domain::label_dict::LabelDict;

/// Target id used for samples without a ground-truth label.
/// Never reaches the loss or the metrics — unlabelled datasets
/// are only run through inference.
pub const NO_LABEL: i64 = -1;

/// One fully tokenised and padded sample.
/// Sequence format: [CLS] text [SEP] [PAD]...
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSample {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub target:         i64,
}

/// Random-access dataset over raw texts. Holds the tokenizer
/// and the resolved label ids; no other mutable state.
pub struct ClassDataset {
    texts:       Vec<String>,
    targets:     Vec<i64>,
    tokenizer:   Tokenizer,
    max_seq_len: usize,
    cls_id:      u32,
    sep_id:      u32,
    pad_id:      u32,
    labelled:    bool,
}

impl ClassDataset {
    /// Build a dataset for training or labelled evaluation.
    /// Every example must carry a label that resolves through
    /// the dictionary; the first failure aborts construction.
    pub fn labelled(
        examples:    &[Example],
        label_dict:  &LabelDict,
        tokenizer:   Tokenizer,
        max_seq_len: usize,
    ) -> Result<Self> {
        let mut texts   = Vec::with_capacity(examples.len());
        let mut targets = Vec::with_capacity(examples.len());

        for (i, example) in examples.iter().enumerate() {
            let label = example
                .label
                .as_deref()
                .ok_or_else(|| anyhow!("row {} has no label", i + 1))?;
            let id = label_dict
                .lookup(label)
                .with_context(|| format!("row {}", i + 1))?;
            texts.push(example.text.clone());
            targets.push(id as i64);
        }

        Self::assemble(texts, targets, tokenizer, max_seq_len, true)
    }

    /// Build a dataset for prediction-only evaluation.
    /// Targets are filled with the NO_LABEL sentinel.
    pub fn unlabelled(
        examples:    &[Example],
        tokenizer:   Tokenizer,
        max_seq_len: usize,
    ) -> Result<Self> {
        let texts: Vec<String> = examples.iter().map(|e| e.text.clone()).collect();
        let targets = vec![NO_LABEL; texts.len()];
        Self::assemble(texts, targets, tokenizer, max_seq_len, false)
    }

    fn assemble(
        texts:       Vec<String>,
        targets:     Vec<i64>,
        tokenizer:   Tokenizer,
        max_seq_len: usize,
        labelled:    bool,
    ) -> Result<Self> {
        if max_seq_len < 2 {
            bail!("max_seq_len must be at least 2, got {max_seq_len}");
        }

        // Special token ids come from the tokenizer vocabulary so the
        // dataset never hard-codes an id the vocabulary doesn't have.
        let special = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| anyhow!("tokenizer vocabulary has no '{token}' token"))
        };
        let cls_id = special("[CLS]")?;
        let sep_id = special("[SEP]")?;
        let pad_id = special("[PAD]")?;

        Ok(Self { texts, targets, tokenizer, max_seq_len, cls_id, sep_id, pad_id, labelled })
    }

    /// Tokenise one text into a fixed-length sample.
    /// Fails on an out-of-range index or a tokenizer error.
    pub fn encode(&self, index: usize) -> Result<ClassSample> {
        let text = self.texts.get(index).ok_or_else(|| {
            anyhow!("index {index} out of range for {} examples", self.texts.len())
        })?;

        let encoding = self
            .tokenizer
            .encode(text.as_str(), false)
            .map_err(|e| anyhow!("tokenisation error at index {index}: {e}"))?;

        // [CLS] text [SEP], truncated to max_seq_len
        let mut input_ids = Vec::with_capacity(self.max_seq_len);
        input_ids.push(self.cls_id);
        input_ids.extend_from_slice(encoding.get_ids());
        input_ids.push(self.sep_id);
        input_ids.truncate(self.max_seq_len);

        // Mask: 1 for real tokens, 0 for padding
        let mut attention_mask = vec![1u32; input_ids.len()];
        while input_ids.len() < self.max_seq_len {
            input_ids.push(self.pad_id);
            attention_mask.push(0);
        }

        Ok(ClassSample {
            input_ids,
            attention_mask,
            target: self.targets[index],
        })
    }

    pub fn sample_count(&self) -> usize {
        self.texts.len()
    }

    /// True when the source table carried a label column
    pub fn is_labelled(&self) -> bool {
        self.labelled
    }

    /// Resolved label ids, in row order (NO_LABEL when unlabelled)
    pub fn targets(&self) -> &[i64] {
        &self.targets
    }
}

impl Dataset<ClassSample> for ClassDataset {
    // The trait cannot carry an error, so a failed encode is
    // logged loudly before the sample is dropped from the epoch.
    fn get(&self, index: usize) -> Option<ClassSample> {
        match self.encode(index) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::error!("dropping sample {index}: {e}");
                None
            }
        }
    }

    fn len(&self) -> usize {
        self.texts.len()
    }
}

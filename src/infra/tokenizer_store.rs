// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Manages tokenizer building, saving, and loading.
//
// The vocabulary is built word-level from the training corpus:
// frequency-ranked words after lowercasing and edge-punctuation
// stripping, with four reserved special tokens. The tokenizer
// JSON is written in the HuggingFace format that
// Tokenizer::from_file() expects, then reloaded — evaluation
// loads the same file, so train and eval share one vocabulary.
//
// Special token ids (fixed):
//   [PAD] = 0, [UNK] = 1, [CLS] = 2, [SEP] = 3

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    /// Load an existing tokenizer or build a new one from texts
    pub fn load_or_build(
        &self,
        texts:      &[String],
        vocab_size: usize,
    ) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading existing tokenizer from disk");
            self.load()
        } else {
            tracing::info!("Building new tokenizer (vocab_size={})", vocab_size);
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer from its JSON file
    pub fn load(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Count word frequencies over the corpus ────────────────────
        use std::collections::HashMap;
        let mut freq: HashMap<String, usize> = HashMap::new();

        for text in texts {
            for word in text.split_whitespace() {
                // Lowercase to match the BertNormalizer below,
                // strip punctuation from the edges
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Frequency-ranked, capped at vocab_size minus the
        // four reserved special-token slots
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(4));

        // ── Step 2: Build the vocab JSON ──────────────────────────────────────
        let mut vocab = serde_json::json!({
            "[PAD]": 0,
            "[UNK]": 1,
            "[CLS]": 2,
            "[SEP]": 3,
        });

        let mut next_id = 4usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": "[PAD]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": "[UNK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": "[CLS]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 3, "content": "[SEP]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?
        ).with_context(|| "cannot write tokenizer JSON")?;

        tracing::info!(
            "Tokenizer built with {} entries, saved to '{}'",
            next_id,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "text-classifier-tokenizer-{}-{}",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn builds_and_reloads_a_vocabulary() {
        let dir = temp_dir("build");
        let texts = vec![
            "markets rallied after the announcement".to_string(),
            "the team won the championship".to_string(),
        ];

        let store = TokenizerStore::new(dir.to_str().unwrap().to_string());
        let built = store.load_or_build(&texts, 100).unwrap();
        // Second call must take the load path and agree on ids
        let reloaded = store.load_or_build(&texts, 100).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(built.token_to_id("[PAD]"), Some(0));
        assert_eq!(built.token_to_id("[CLS]"), Some(2));
        assert_eq!(built.token_to_id("markets"), reloaded.token_to_id("markets"));
        assert!(built.token_to_id("markets").is_some());
    }

    #[test]
    fn unknown_words_map_to_unk() {
        let dir = temp_dir("unk");
        let texts = vec!["only these words exist".to_string()];

        let store = TokenizerStore::new(dir.to_str().unwrap().to_string());
        let tokenizer = store.load_or_build(&texts, 100).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let encoding = tokenizer.encode("zebra", false).unwrap();
        assert_eq!(encoding.get_ids(), &[1]); // [UNK]
    }
}

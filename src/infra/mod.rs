// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns used by multiple layers:
//
//   checkpoint.rs      — Model weights via Burn's CompactRecorder,
//                        plus the TrainConfig JSON evaluation needs
//                        to rebuild the exact architecture.
//
//   label_store.rs     — The label dictionary as a JSON map.
//                        Training writes it once; evaluation loads
//                        it read-only. The ids must match exactly
//                        or evaluation results are meaningless.
//
//   tokenizer_store.rs — Tokenizer persistence. Builds a word-level
//                        vocabulary from the training corpus if none
//                        exists, so training and evaluation share
//                        one vocabulary.
//
//   metrics.rs         — Epoch metrics CSV logging and the
//                        accuracy / macro-F1 computations.
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Label dictionary persistence
pub mod label_store;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger and metric computations
pub mod metrics;

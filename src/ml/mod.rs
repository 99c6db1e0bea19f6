// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// ALL Burn framework specific code lives here. No other layer
// imports burn types directly except the data layer's Dataset
// and Batcher impls.
//
// What's in this layer:
//
//   model.rs     — The transformer encoder classifier
//                  Token + positional embeddings, N encoder
//                  blocks (multi-head attention with padding
//                  mask, GELU feed-forward, layer norm,
//                  residuals), masked mean pooling and a
//                  linear classification head.
//
//   trainer.rs   — The hand-written training loop
//                  Forward/loss, backward, Adam step,
//                  per-epoch validation, metrics row and
//                  checkpoint.
//
//   evaluator.rs — The inference pass
//                  Loads a checkpoint, runs no-gradient
//                  forward passes in input order and
//                  collects arg-max predictions.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Transformer encoder classification model architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference pass — loads a checkpoint and predicts labels
pub mod evaluator;

// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types that define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain structs, enums, and traits
//
// Keeping this layer pure means the label bookkeeping and the
// strategy selection can be unit tested without any tensor
// backend in scope.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One (text, label) row from the input table
pub mod example;

// Stable mapping from label strings to dense integer ids
pub mod label_dict;

// How much of the model the optimiser is allowed to touch
pub mod strategy;

// Core abstractions (traits) that other layers implement
pub mod traits;

// ============================================================
// Layer 4 — Train/Validation Splitter
// ============================================================
// Shuffles samples with a FIXED seed and splits them into a
// training set and a validation set.
//
// The seed matters: two runs with the same data and the same
// seed must produce the same split, so metrics are comparable
// across hyperparameter experiments.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom with a
// seeded StdRng rather than thread_rng.
//
// Reference: rand crate documentation

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle `samples` with the given seed and split into
/// (train, validation) at `round(len * train_fraction)`.
///
/// Same seed, same input → identical output, element for element.
pub fn split_train_val<T>(
    mut samples: Vec<T>,
    train_fraction: f64,
    seed: u64,
) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    // split_off(n) removes elements [n..] and returns them
    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation (seed {})",
        samples.len(),
        val.len(),
        seed,
    );

    (samples, val)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_split_sizes() {
        let items: Vec<usize> = (0..100).collect();
        let (train, val)      = split_train_val(items, 0.8, 42);
        assert_eq!(train.len(), 80);
        assert_eq!(val.len(),   20);
    }

    #[test]
    fn all_items_preserved() {
        let items: Vec<usize> = (0..50).collect();
        let (mut train, val)  = split_train_val(items, 0.7, 42);
        train.extend(val);
        train.sort_unstable();
        assert_eq!(train, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let items: Vec<usize> = (0..64).collect();
        let (t1, v1) = split_train_val(items.clone(), 0.75, 7);
        let (t2, v2) = split_train_val(items, 0.75, 7);
        assert_eq!(t1, t2);
        assert_eq!(v1, v2);
    }

    #[test]
    fn different_seed_usually_differs() {
        let items: Vec<usize> = (0..64).collect();
        let (t1, _) = split_train_val(items.clone(), 0.75, 1);
        let (t2, _) = split_train_val(items, 0.75, 2);
        assert_ne!(t1, t2);
    }

    #[test]
    fn empty_dataset() {
        let items: Vec<usize> = Vec::new();
        let (train, val)      = split_train_val(items, 0.8, 42);
        assert!(train.is_empty());
        assert!(val.is_empty());
    }

    #[test]
    fn full_training_split() {
        let items: Vec<usize> = (0..10).collect();
        let (train, val)      = split_train_val(items, 1.0, 42);
        assert_eq!(train.len(), 10);
        assert!(val.is_empty());
    }
}

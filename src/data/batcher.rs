// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<ClassSample>
// into tensors the model can consume.
//
// Input:  Vec of N ClassSamples, each with sequences of length S
// Output: ClassBatch with [N, S] id/mask tensors and [N] targets
//
// All samples are already padded to the same length by the
// dataset adapter, so stacking is a flatten + reshape. The last
// batch of an epoch may have N < batch_size.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ClassSample;

// ─── ClassBatch ───────────────────────────────────────────────────────────────
/// A batch of classification samples ready for a forward pass.
#[derive(Debug, Clone)]
pub struct ClassBatch<B: Backend> {
    /// Token id sequences — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Attention masks — shape: [batch_size, seq_len]
    /// 1 = real token, 0 = padding
    pub attention_mask: Tensor<B, 2, Int>,

    /// Ground-truth label ids — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── ClassBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors land on the right backend.
#[derive(Clone, Debug)]
pub struct ClassBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<ClassSample, ClassBatch<B>> for ClassBatcher<B> {
    fn batch(&self, items: Vec<ClassSample>) -> ClassBatch<B> {
        assert!(!items.is_empty(), "cannot build a batch from zero samples");

        let batch_size = items.len();
        // All sequences share one length — enforced by the dataset
        let seq_len = items[0].input_ids.len();

        // Flatten to one long Vec<i32>, then reshape to [N, S].
        // Burn's Int tensors are created from i32 slices here.
        let input_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.input_ids.iter().map(|&x| x as i32))
            .collect();

        let mask_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
            .collect();

        let targets: Vec<i32> = items.iter().map(|s| s.target as i32).collect();

        let input_ids = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let targets = Tensor::<B, 1, Int>::from_ints(targets.as_slice(), &self.device);

        ClassBatch { input_ids, attention_mask, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArrayDevice;
    use burn::backend::NdArray;

    fn sample(ids: Vec<u32>, target: i64) -> ClassSample {
        let attention_mask = ids.iter().map(|&x| u32::from(x != 0)).collect();
        ClassSample { input_ids: ids, attention_mask, target }
    }

    #[test]
    fn stacks_samples_into_expected_shapes() {
        let batcher = ClassBatcher::<NdArray>::new(NdArrayDevice::default());
        let batch = batcher.batch(vec![
            sample(vec![2, 5, 6, 0], 0),
            sample(vec![2, 7, 0, 0], 1),
            sample(vec![2, 8, 9, 3], 2),
        ]);

        assert_eq!(batch.input_ids.dims(), [3, 4]);
        assert_eq!(batch.attention_mask.dims(), [3, 4]);
        assert_eq!(batch.targets.dims(), [3]);
    }

    #[test]
    fn targets_survive_the_round_trip() {
        let batcher = ClassBatcher::<NdArray>::new(NdArrayDevice::default());
        let batch = batcher.batch(vec![sample(vec![2, 5], 1), sample(vec![2, 6], 0)]);

        let targets: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(targets, vec![1, 0]);
    }

    #[test]
    #[should_panic(expected = "zero samples")]
    fn empty_batch_panics_with_a_message() {
        let batcher = ClassBatcher::<NdArray>::new(NdArrayDevice::default());
        batcher.batch(Vec::new());
    }
}

// ============================================================
// Layer 5 — Evaluator
// ============================================================
use anyhow::{anyhow, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::{batcher::ClassBatcher, dataset::ClassDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics;
use crate::ml::model::{TextClassifierConfig, TextClassifierModel};

type EvalBackend = burn::backend::NdArray;

/// The result of one inference pass over a dataset.
pub struct EvalOutcome {
    /// Arg-max class id per example, in input row order
    pub predictions: Vec<usize>,

    /// Only present when the dataset carried ground-truth labels
    pub accuracy: Option<f64>,
    pub macro_f1: Option<f64>,
}

pub struct Evaluator {
    model:       TextClassifierModel<EvalBackend>,
    device:      burn::backend::ndarray::NdArrayDevice,
    batch_size:  usize,
    num_classes: usize,
}

impl Evaluator {
    /// Rebuild the trained architecture from the persisted config
    /// and load the latest checkpointed weights into it.
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        num_classes:  usize,
    ) -> Result<Self> {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let cfg    = ckpt_manager.load_config()?;

        // Dropout off for deterministic inference
        let model_cfg = TextClassifierConfig::new(
            cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, num_classes,
        )
        .with_dropout(0.0);

        let model: TextClassifierModel<EvalBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self { model, device, batch_size: cfg.batch_size, num_classes })
    }

    /// Run a no-gradient forward pass over every batch in input
    /// order and aggregate accuracy / macro F1 when targets exist.
    pub fn run(&self, dataset: ClassDataset) -> Result<EvalOutcome> {
        let labelled = dataset.is_labelled();
        let targets: Vec<usize> = if labelled {
            dataset.targets().iter().map(|&t| t as usize).collect()
        } else {
            Vec::new()
        };

        // No shuffle: batch order must follow row order so the
        // predictions line up with the input table.
        let batcher = ClassBatcher::<EvalBackend>::new(self.device.clone());
        let loader  = DataLoaderBuilder::new(batcher)
            .batch_size(self.batch_size)
            .num_workers(1)
            .build(dataset);

        let mut predictions = Vec::new();
        for batch in loader.iter() {
            let logits = self.model.forward(batch.input_ids, batch.attention_mask);
            let predicted = logits.argmax(1).flatten::<1>(0, 1);

            let batch_preds: Vec<i64> = predicted
                .into_data()
                .to_vec()
                .map_err(|e| anyhow!("cannot read predictions: {e:?}"))?;
            predictions.extend(batch_preds.into_iter().map(|p| p as usize));
        }

        let (accuracy, macro_f1) = if labelled {
            (
                Some(metrics::accuracy(&predictions, &targets)),
                Some(metrics::macro_f1(&predictions, &targets, self.num_classes)),
            )
        } else {
            (None, None)
        };

        Ok(EvalOutcome { predictions, accuracy, macro_f1 })
    }
}

// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Hand-written train + validation loop using Burn's DataLoader
// and Adam. One epoch = a full pass over the shuffled training
// batches, then a fixed-order no-gradient pass over validation.
//
// Backend notes:
//   - Training uses Autodiff<NdArray> for gradients
//   - model.valid() returns the model on the inner NdArray
//     backend, which also disables dropout for evaluation
//   - argmax(1) returns [batch,1] so we flatten before .equal()
//
// Epoch losses are the unweighted mean of per-batch losses:
// a final smaller batch counts once, same as the full batches.
//
// Failure policy: any error while saving a checkpoint or any
// backend panic aborts the run. There is no retry and no
// partial-failure recovery.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClassBatcher, dataset::ClassDataset};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{TextClassifierConfig, TextClassifierModel};

type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
type InnerBackend = burn::backend::NdArray;

/// Run the full training loop and return one metrics row per
/// epoch — exactly `cfg.epochs` of them.
pub fn run_training(
    cfg:            &TrainConfig,
    num_classes:    usize,
    train_dataset:  ClassDataset,
    val_dataset:    ClassDataset,
    ckpt_manager:   CheckpointManager,
    metrics_logger: MetricsLogger,
) -> Result<Vec<EpochMetrics>> {
    let device = burn::backend::ndarray::NdArrayDevice::default();

    // An empty partition would make its epoch loss the mean of
    // zero batches — refuse up front instead of logging NaN.
    if train_dataset.sample_count() == 0 || val_dataset.sample_count() == 0 {
        bail!(
            "need at least one training and one validation sample, got {} and {}",
            train_dataset.sample_count(),
            val_dataset.sample_count()
        );
    }

    // ── Build model ───────────────────────────────────────────────────────────
    // The strategy is dispatched exactly once, here, into the
    // freeze_encoder flag of the model config.
    let model_cfg = TextClassifierConfig::new(
        cfg.vocab_size, cfg.max_seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, num_classes,
    )
    .with_dropout(cfg.dropout)
    .with_freeze_encoder(cfg.strategy.freezes_encoder());

    let mut model: TextClassifierModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} layers, d_model={}, {} classes, strategy={}",
        cfg.num_layers, cfg.d_model, num_classes, cfg.strategy,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (autodiff backend, reshuffled per epoch) ─────────
    let train_batcher = ClassBatcher::<TrainBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (inner backend, fixed order) ───────────────────
    let val_batcher = ClassBatcher::<InnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut history = Vec::with_capacity(cfg.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _logits) = model.forward_loss(
                batch.input_ids,
                batch.attention_mask,
                batch.targets,
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        // Both partitions are non-empty, so each phase sees at
        // least one batch and these means are always defined.
        let avg_train_loss = train_loss_sum / train_batches as f64;

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → TextClassifierModel<InnerBackend>,
        // no gradient tracking, dropout disabled
        let model_valid = model.valid();

        let mut val_loss_sum  = 0.0f64;
        let mut val_batches   = 0usize;
        let mut correct       = 0usize;
        let mut total_samples = 0usize;

        for batch in val_loader.iter() {
            let (loss, logits) = model_valid.forward_loss(
                batch.input_ids,
                batch.attention_mask,
                batch.targets.clone(),
            );

            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;

            // argmax(1) returns shape [batch, 1] — flatten to [batch]
            // before comparing with targets which is [batch]
            let predicted = logits.argmax(1).flatten::<1>(0, 1);

            total_samples += batch.targets.dims()[0];
            let batch_correct: i64 = predicted
                .equal(batch.targets)
                .int().sum().into_scalar().elem::<i64>();
            correct += batch_correct as usize;
        }

        let avg_val_loss = val_loss_sum / val_batches as f64;
        let val_acc      = correct as f64 / total_samples as f64;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_acc={:.1}%",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, val_acc * 100.0,
        );

        let epoch_metrics = EpochMetrics::new(epoch, avg_train_loss, avg_val_loss, val_acc);
        metrics_logger.log(&epoch_metrics)?;
        history.push(epoch_metrics);

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(history)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::example::Example;
    use crate::domain::label_dict::LabelDict;
    use crate::domain::strategy::FineTuneStrategy;
    use crate::infra::tokenizer_store::TokenizerStore;

    fn synthetic_examples() -> Vec<Example> {
        vec![
            Example::new("stocks rallied on strong earnings", "economy"),
            Example::new("markets fell after the rate decision", "economy"),
            Example::new("earnings beat every forecast", "economy"),
            Example::new("inflation slowed again this quarter", "economy"),
            Example::new("the striker scored a late winner", "sports"),
            Example::new("the team clinched the title at home", "sports"),
            Example::new("a record crowd watched the final", "sports"),
            Example::new("the keeper saved two penalties", "sports"),
        ]
    }

    #[test]
    fn reports_one_summary_per_epoch() {
        let dir = std::env::temp_dir().join(format!(
            "text-classifier-trainer-{}",
            std::process::id()
        ));
        let dir_s = dir.to_str().unwrap().to_string();

        let examples = synthetic_examples();
        let labels: Vec<&str> = examples
            .iter()
            .filter_map(|e| e.label.as_deref())
            .collect();
        let dict = LabelDict::build(labels).unwrap();

        let texts: Vec<String> = examples.iter().map(|e| e.text.clone()).collect();
        let tokenizer = TokenizerStore::new(dir_s.clone())
            .load_or_build(&texts, 200)
            .unwrap();

        // Deliberately indivisible: 6 train examples, batch size 4
        // → 2 batches (4, 2) per epoch
        let (train, val) = crate::data::splitter::split_train_val(examples, 0.75, 42);
        let train_ds = ClassDataset::labelled(&train, &dict, tokenizer.clone(), 12).unwrap();
        let val_ds   = ClassDataset::labelled(&val, &dict, tokenizer, 12).unwrap();

        let cfg = TrainConfig {
            data_path:      String::new(),
            checkpoint_dir: dir_s.clone(),
            max_seq_len:    12,
            batch_size:     4,
            epochs:         2,
            lr:             1e-3,
            seed:           42,
            train_fraction: 0.75,
            vocab_size:     200,
            d_model:        16,
            num_heads:      2,
            num_layers:     1,
            d_ff:           32,
            dropout:        0.1,
            strategy:       FineTuneStrategy::Full,
        };

        let history = run_training(
            &cfg,
            dict.len(),
            train_ds,
            val_ds,
            CheckpointManager::new(dir_s.clone()),
            MetricsLogger::new(dir_s).unwrap(),
        )
        .unwrap();

        assert_eq!(history.len(), 2);
        for m in &history {
            assert!(m.train_loss.is_finite() && m.train_loss >= 0.0);
            assert!(m.val_loss.is_finite() && m.val_loss >= 0.0);
            assert!((0.0..=1.0).contains(&m.val_acc));
        }
        assert!(dir.join("model_epoch_2.mpk.gz").exists());
        assert!(dir.join("latest_epoch.json").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn empty_validation_split_is_rejected() {
        let dir = std::env::temp_dir().join(format!(
            "text-classifier-trainer-noval-{}",
            std::process::id()
        ));
        let dir_s = dir.to_str().unwrap().to_string();

        let examples = synthetic_examples();
        let labels: Vec<&str> = examples
            .iter()
            .filter_map(|e| e.label.as_deref())
            .collect();
        let dict = LabelDict::build(labels).unwrap();

        let texts: Vec<String> = examples.iter().map(|e| e.text.clone()).collect();
        let tokenizer = TokenizerStore::new(dir_s.clone())
            .load_or_build(&texts, 200)
            .unwrap();

        let train_ds = ClassDataset::labelled(&examples, &dict, tokenizer.clone(), 12).unwrap();
        let val_ds   = ClassDataset::labelled(&[], &dict, tokenizer, 12).unwrap();

        let cfg = TrainConfig {
            checkpoint_dir: dir_s.clone(),
            max_seq_len:    12,
            batch_size:     4,
            epochs:         1,
            vocab_size:     200,
            d_model:        16,
            num_heads:      2,
            num_layers:     1,
            d_ff:           32,
            ..TrainConfig::default()
        };

        let result = run_training(
            &cfg,
            dict.len(),
            train_ds,
            val_ds,
            CheckpointManager::new(dir_s.clone()),
            MetricsLogger::new(dir_s).unwrap(),
        );
        std::fs::remove_dir_all(&dir).ok();

        // Must fail before any epoch runs or checkpoint is saved
        assert!(result.is_err());
    }
}

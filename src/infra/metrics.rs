// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two jobs live here:
//   1. MetricsLogger — appends one row per epoch to metrics.csv
//      so learning curves can be plotted after the run
//   2. accuracy / macro_f1 — the aggregate metrics computed
//      from prediction and target id slices at evaluation time
//
// Output file: {checkpoint_dir}/metrics.csv
//
// Example CSV output:
//   epoch,train_loss,val_loss,val_acc
//   1,1.824500,1.789200,0.423000
//   2,1.290100,1.354300,0.584000
//
// Reading the curves: val_loss rising while train_loss falls
// means overfitting; val_acc should climb epoch over epoch.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

// ─── Epoch metrics ────────────────────────────────────────────────────────────

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Unweighted mean of per-batch training losses
    pub train_loss: f64,

    /// Unweighted mean of per-batch validation losses
    pub val_loss: f64,

    /// Fraction of validation examples classified correctly,
    /// in [0.0, 1.0]
    pub val_acc: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_acc: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_acc }
    }

    /// True if this epoch improved on the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet, so a
    /// resumed run appends to the existing log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.val_acc,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Aggregate metrics ────────────────────────────────────────────────────────

/// Fraction of positions where prediction equals target.
/// Returns 0.0 for empty input.
pub fn accuracy(predictions: &[usize], targets: &[usize]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(targets)
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / predictions.len() as f64
}

/// Macro-averaged F1 over all `num_classes` classes.
///
/// Per class c: precision = TP / (TP + FP), recall = TP / (TP + FN),
/// F1 = 2PR / (P + R), with 0/0 treated as 0. The macro average
/// weights every class equally regardless of support.
pub fn macro_f1(predictions: &[usize], targets: &[usize], num_classes: usize) -> f64 {
    if num_classes == 0 {
        return 0.0;
    }

    let mut tp = vec![0usize; num_classes];
    let mut fp = vec![0usize; num_classes];
    let mut fn_ = vec![0usize; num_classes];

    for (&p, &t) in predictions.iter().zip(targets) {
        if p == t {
            tp[p] += 1;
        } else {
            if p < num_classes {
                fp[p] += 1;
            }
            if t < num_classes {
                fn_[t] += 1;
            }
        }
    }

    let f1_sum: f64 = (0..num_classes)
        .map(|c| {
            let denom = 2 * tp[c] + fp[c] + fn_[c];
            if denom == 0 {
                0.0
            } else {
                2.0 * tp[c] as f64 / denom as f64
            }
        })
        .sum();

    f1_sum / num_classes as f64
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_improvement_compares_val_loss() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.4);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn perfect_predictions_score_one() {
        let targets = vec![0, 1, 2, 1, 0];
        assert_eq!(accuracy(&targets, &targets), 1.0);
        assert_eq!(macro_f1(&targets, &targets, 3), 1.0);
    }

    #[test]
    fn fully_wrong_predictions_score_zero() {
        let predictions = vec![1, 2, 0, 2, 1];
        let targets     = vec![0, 1, 2, 1, 0];
        assert_eq!(accuracy(&predictions, &targets), 0.0);
        assert_eq!(macro_f1(&predictions, &targets, 3), 0.0);
    }

    #[test]
    fn accuracy_counts_matches() {
        let predictions = vec![0, 1, 1, 0];
        let targets     = vec![0, 1, 0, 0];
        assert!((accuracy(&predictions, &targets) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn macro_f1_weights_classes_equally() {
        // Class 0: tp=2, fp=1, fn=0 → F1 = 4/5
        // Class 1: tp=0, fp=0, fn=1 → F1 = 0
        let predictions = vec![0, 0, 0];
        let targets     = vec![0, 0, 1];
        let f1 = macro_f1(&predictions, &targets, 2);
        assert!((f1 - 0.4).abs() < 1e-12);
    }

    #[test]
    fn metrics_logger_appends_rows() {
        let dir = std::env::temp_dir().join(format!(
            "text-classifier-metrics-{}",
            std::process::id()
        ));
        let logger = MetricsLogger::new(dir.to_str().unwrap().to_string()).unwrap();
        logger.log(&EpochMetrics::new(1, 1.5, 1.4, 0.5)).unwrap();
        logger.log(&EpochMetrics::new(2, 1.2, 1.1, 0.6)).unwrap();

        let contents = std::fs::read_to_string(logger.csv_path()).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3); // header + 2 rows
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_acc");
        assert!(lines[1].starts_with("1,"));
        assert!(lines[2].starts_with("2,"));
    }
}

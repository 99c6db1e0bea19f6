// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Runs a trained checkpoint against a CSV table:
//
//   Step 1: Load persisted artefacts (config, label dictionary,
//           tokenizer, checkpoint)
//   Step 2: Load and clean the evaluation rows
//   Step 3: Build a labelled or unlabelled dataset
//   Step 4: No-gradient prediction pass, in row order
//   Step 5: Print aggregate metrics (labels permitting)
//   Step 6: Write the input table back out with an added
//           `prediction` column
//
// A label that exists in the data but not in the persisted
// dictionary is fatal: silently remapping it would make every
// aggregate number meaningless.

use anyhow::{bail, Context, Result};

use crate::data::{dataset::ClassDataset, loader::CsvLoader, preprocessor::Preprocessor};
use crate::domain::example::Example;
use crate::domain::label_dict::LabelDict;
use crate::domain::traits::ExampleSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    label_store::LabelStore,
    tokenizer_store::TokenizerStore,
};
use crate::ml::evaluator::{EvalOutcome, Evaluator};

pub struct EvaluateUseCase {
    data_path:      String,
    checkpoint_dir: String,
    output_path:    String,
}

impl EvaluateUseCase {
    pub fn new(
        data_path:      impl Into<String>,
        checkpoint_dir: impl Into<String>,
        output_path:    impl Into<String>,
    ) -> Self {
        Self {
            data_path:      data_path.into(),
            checkpoint_dir: checkpoint_dir.into(),
            output_path:    output_path.into(),
        }
    }

    pub fn execute(&self) -> Result<()> {
        // ── Step 1: Load persisted artefacts ──────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir);
        let label_dict   = LabelStore::new(&self.checkpoint_dir).load()?;
        let tokenizer    = TokenizerStore::new(&self.checkpoint_dir).load()?;
        let cfg          = ckpt_manager.load_config()?;

        // ── Step 2: Load and clean the evaluation rows ────────────────────────
        let raw = CsvLoader::new(&self.data_path).load_all()?;
        if raw.is_empty() {
            bail!("evaluation file '{}' contains no rows", self.data_path);
        }

        // The SAME cleaning as training, or the vocabularies drift
        let preprocessor = Preprocessor::new();
        let examples: Vec<Example> = raw
            .into_iter()
            .map(|e| Example {
                text:  preprocessor.clean(&e.text),
                label: e.label,
            })
            .collect();

        // ── Step 3: Labelled or unlabelled dataset ────────────────────────────
        let labelled_rows = examples.iter().filter(|e| e.label.is_some()).count();
        let dataset = if labelled_rows == examples.len() {
            ClassDataset::labelled(&examples, &label_dict, tokenizer, cfg.max_seq_len)?
        } else if labelled_rows == 0 {
            tracing::info!("No label column — producing predictions only");
            ClassDataset::unlabelled(&examples, tokenizer, cfg.max_seq_len)?
        } else {
            bail!(
                "'{}' labels only {} of {} rows — label all rows or none",
                self.data_path, labelled_rows, examples.len()
            );
        };

        // ── Step 4: Prediction pass ───────────────────────────────────────────
        let evaluator = Evaluator::from_checkpoint(&ckpt_manager, label_dict.len())?;
        let outcome   = evaluator.run(dataset)?;

        // ── Step 5: Aggregate metrics ─────────────────────────────────────────
        if let Some(accuracy) = outcome.accuracy {
            println!("Test accuracy: {accuracy:.3}");
        }
        if let Some(macro_f1) = outcome.macro_f1 {
            println!("Macro F1:      {macro_f1:.3}");
        }

        // ── Step 6: Write the augmented table ─────────────────────────────────
        self.write_predictions(&outcome, &label_dict)?;
        println!("Predictions written to '{}'", self.output_path);

        Ok(())
    }

    /// Write the input table back out, unchanged except for an
    /// added `prediction` column holding the predicted label.
    ///
    /// The rows are re-read as raw records so every input column
    /// survives, not just the ones this program understands.
    fn write_predictions(&self, outcome: &EvalOutcome, label_dict: &LabelDict) -> Result<()> {
        let mut reader = csv::Reader::from_path(&self.data_path)
            .with_context(|| format!("cannot reopen input file '{}'", self.data_path))?;

        let mut headers = reader.headers()?.clone();
        headers.push_field("prediction");

        let mut writer = csv::Writer::from_path(&self.output_path)
            .with_context(|| format!("cannot create output file '{}'", self.output_path))?;
        writer.write_record(&headers)?;

        let mut rows = reader.into_records();
        for (i, &pred) in outcome.predictions.iter().enumerate() {
            let mut row = match rows.next() {
                Some(row) => row?,
                None => bail!(
                    "'{}' has {} rows but {} predictions were produced",
                    self.data_path, i, outcome.predictions.len()
                ),
            };

            let predicted_label = label_dict
                .label_of(pred)
                .with_context(|| format!("prediction id {pred} has no label"))?;

            row.push_field(predicted_label);
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "text-classifier-evalcase-{}-{}.csv",
            name,
            std::process::id()
        ))
    }

    #[test]
    fn output_keeps_every_input_column() {
        let input  = temp_path("columns-in");
        let output = temp_path("columns-out");
        std::fs::write(
            &input,
            "id,text,label,source\n\
             7,hello there,greeting,web\n\
             8,see you soon,farewell,mail\n",
        )
        .unwrap();

        let use_case = EvaluateUseCase::new(
            input.to_str().unwrap(),
            "unused",
            output.to_str().unwrap(),
        );
        let dict = LabelDict::build(["greeting", "farewell"]).unwrap();
        let outcome = EvalOutcome {
            predictions: vec![1, 1],
            accuracy:    None,
            macro_f1:    None,
        };

        use_case.write_predictions(&outcome, &dict).unwrap();
        let written = std::fs::read_to_string(&output).unwrap();
        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();

        // The `id` and `source` columns must survive untouched,
        // with `prediction` appended after the originals.
        let mut lines = written.lines();
        assert_eq!(lines.next(), Some("id,text,label,source,prediction"));
        assert_eq!(lines.next(), Some("7,hello there,greeting,web,farewell"));
        assert_eq!(lines.next(), Some("8,see you soon,farewell,mail,farewell"));
    }

    #[test]
    fn more_predictions_than_rows_is_an_error() {
        let input  = temp_path("short-in");
        let output = temp_path("short-out");
        std::fs::write(&input, "text,label\nhello,greeting\n").unwrap();

        let use_case = EvaluateUseCase::new(
            input.to_str().unwrap(),
            "unused",
            output.to_str().unwrap(),
        );
        let dict = LabelDict::build(["greeting"]).unwrap();
        let outcome = EvalOutcome {
            predictions: vec![0, 0],
            accuracy:    None,
            macro_f1:    None,
        };

        let result = use_case.write_predictions(&outcome, &dict);
        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
        assert!(result.is_err());
    }
}

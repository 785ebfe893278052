use std::{num::NonZeroUsize, path::Path};

use log::{info, warn};
use ml_core::{Adam, Network, SerializedModel, SoftmaxCrossEntropy};
use ndarray::s;
use tokio::fs;

use crate::{config::TaskConfig, data::TrainingBatch, error::Result};

/// What a fine-tune run produced. Callers pattern-match instead of
/// comparing an accuracy against a magic zero.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    Trained { accuracy: f32, serialized: String },
    Failed { reason: String },
}

/// Supervised fine-tuning of an adapted model against one training batch.
///
/// Internal failures never escape: the round pipeline must stay alive, so
/// they are logged and surfaced as `TrainOutcome::Failed`.
pub struct FineTuner {
    epochs: usize,
    batch_size: NonZeroUsize,
    validation_split: f32,
    learning_rate: f32,
}

impl FineTuner {
    pub fn new(config: &TaskConfig) -> Self {
        Self {
            epochs: config.epochs,
            batch_size: config.batch_size,
            validation_split: config.validation_split,
            learning_rate: config.learning_rate,
        }
    }

    /// Fits the network, evaluates it on the full batch, and serializes it.
    pub fn fine_tune(&self, network: &mut Network, batch: &TrainingBatch) -> TrainOutcome {
        match self.run(network, batch) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("training failed: {e}");
                TrainOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn run(&self, network: &mut Network, batch: &TrainingBatch) -> Result<TrainOutcome> {
        let x = batch.features()?;
        let y = batch.labels();

        let n = batch.len();
        let val_len = (n as f32 * self.validation_split) as usize;
        let train_len = n - val_len;

        let loss_fn = SoftmaxCrossEntropy::new();
        let mut optimizer = Adam::with_defaults(network.size(), self.learning_rate);
        let mut grad = vec![0.0; network.size()];

        info!("training on {train_len} samples, validating on {val_len}");

        for epoch in 0..self.epochs {
            let mut total_loss = 0.0;
            let mut num_batches = 0;

            let step = self.batch_size.get();
            let mut start = 0;
            while start < train_len {
                let end = (start + step).min(train_len);
                let loss = network.train_step(
                    &mut grad,
                    &loss_fn,
                    &mut optimizer,
                    x.slice(s![start..end, ..]),
                    y.slice(s![start..end]),
                )?;

                total_loss += loss;
                num_batches += 1;
                start = end;
            }

            let train_loss = total_loss / num_batches.max(1) as f32;
            if val_len > 0 {
                let val_accuracy = network.accuracy(
                    x.slice(s![train_len.., ..]),
                    y.slice(s![train_len..]),
                )?;
                info!("epoch {epoch}: loss={train_loss:.4} val_accuracy={val_accuracy:.4}");
            } else {
                info!("epoch {epoch}: loss={train_loss:.4}");
            }
        }

        // Evaluation reuses the data the model just trained on; the held-out
        // tail only ever feeds the per-epoch validation metric above.
        let accuracy = network.accuracy(x, y.view())?;
        info!("model accuracy: {accuracy:.4}");

        let serialized = SerializedModel::from_network(network)?.to_json()?;

        Ok(TrainOutcome::Trained {
            accuracy,
            serialized,
        })
    }

    /// Writes a serialized model string to disk.
    pub async fn save_serialized(path: &Path, serialized: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, serialized).await?;

        info!("serialized model saved to {}", path.display());
        Ok(())
    }
}

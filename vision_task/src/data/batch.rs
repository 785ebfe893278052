use ndarray::{Array1, Array3, Array4, ArrayView2, Axis};

use ml_core::MlErr;

use crate::error::{Result, TaskErr};

/// The in-memory training set for one round: every image stacked along a
/// leading batch axis, channel values in `[0, 1]`, plus one label per image.
///
/// Rebuilt from scratch every pipeline run; never cached across rounds.
#[derive(Debug, Clone)]
pub struct TrainingBatch {
    images: Array4<f32>,
    labels: Array1<f32>,
}

impl TrainingBatch {
    /// Stacks per-image tensors (all `(side, side, 3)`) into the batch.
    ///
    /// # Errors
    /// `TaskErr::Model` when the batch is empty or shapes disagree.
    pub fn new(images: Vec<Array3<f32>>, labels: Vec<f32>) -> Result<Self> {
        if images.is_empty() {
            return Err(TaskErr::Model(MlErr::InvalidInput(
                "dataset produced no images",
            )));
        }
        if images.len() != labels.len() {
            return Err(TaskErr::Model(MlErr::ShapeMismatch {
                what: "labels",
                got: labels.len(),
                expected: images.len(),
            }));
        }

        let views: Vec<_> = images.iter().map(|a| a.view()).collect();
        let images = ndarray::stack(Axis(0), &views)
            .map_err(|_| TaskErr::Model(MlErr::InvalidInput("image tensors disagree on shape")))?;

        Ok(Self {
            images,
            labels: Array1::from_vec(labels),
        })
    }

    pub fn len(&self) -> usize {
        self.images.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn images(&self) -> &Array4<f32> {
        &self.images
    }

    pub fn labels(&self) -> &Array1<f32> {
        &self.labels
    }

    /// The batch flattened to `(n, side * side * 3)` for the dense stack.
    pub fn features(&self) -> Result<ArrayView2<f32>> {
        let n = self.len();
        let d = self.images.len() / n;

        self.images
            .view()
            .into_shape_with_order((n, d))
            .map_err(|_| TaskErr::Model(MlErr::InvalidInput("batch tensor is not contiguous")))
    }
}

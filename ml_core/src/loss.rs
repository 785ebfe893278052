use ndarray::{Array2, ArrayView1, ArrayView2};

/// Floor applied to predicted probabilities before taking the log.
const EPS: f32 = 1e-7;

pub trait LossFn {
    /// Measures the loss of a batch of predictions against sparse labels.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<f32>) -> f32;

    /// Returns the delta to feed into the output layer's backward pass.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<f32>) -> Array2<f32>;
}

/// Sparse categorical cross-entropy over softmax probabilities.
///
/// `loss_prime` returns the gradient with respect to the *logits*
/// (`probs - onehot`, mean-scaled): the softmax Jacobian is folded in here,
/// and the output layer must not chain an activation derivative on top.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftmaxCrossEntropy;

impl SoftmaxCrossEntropy {
    pub fn new() -> Self {
        Self
    }
}

/// Labels outside the class range clamp to the last class.
fn class_index(label: f32, num_classes: usize) -> usize {
    (label as usize).min(num_classes - 1)
}

impl LossFn for SoftmaxCrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<f32>) -> f32 {
        let (n, k) = y_pred.dim();
        if n == 0 {
            return 0.;
        }

        let total: f32 = y
            .iter()
            .enumerate()
            .map(|(i, &label)| -y_pred[[i, class_index(label, k)]].max(EPS).ln())
            .sum();

        total / n as f32
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<f32>) -> Array2<f32> {
        let (n, k) = y_pred.dim();
        let mut d = y_pred.to_owned();

        for (i, &label) in y.iter().enumerate() {
            d[[i, class_index(label, k)]] -= 1.;
        }

        d / n.max(1) as f32
    }
}

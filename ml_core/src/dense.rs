use ndarray::{linalg, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis};

use crate::{activation::softmax_rows, Activation};

/// A densely connected layer reading its weights and biases from a slice of
/// a flat parameter buffer.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    activation: Activation,
    size: usize,

    // Forward metadata, cached for the backward pass.
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    pub fn new(dim: (usize, usize), activation: Activation) -> Self {
        let zeros = Array2::zeros((1, 1));

        Self {
            dim,
            activation,
            size: (dim.0 + 1) * dim.1,
            x: zeros.clone(),
            z: zeros,
        }
    }

    /// Returns the amount of parameters this layer reads from the flat buffer.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn units(&self) -> usize {
        self.dim.1
    }

    /// Computes `act(x * w + b)` and caches the intermediates.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Array2<f32> {
        let (w, b) = self.view_params(params);

        self.z = x.dot(&w) + &b;
        self.x = x.to_owned();

        match self.activation {
            Activation::Linear => self.z.clone(),
            Activation::Softmax => {
                let mut a = self.z.clone();
                softmax_rows(&mut a);
                a
            }
            act => self.z.mapv(|z| act.f(z)),
        }
    }

    /// Writes this layer's gradient into its slice of the flat gradient
    /// buffer and returns the delta for the layer below.
    ///
    /// For a softmax output the incoming delta is already taken with respect
    /// to the logits (the loss folds the softmax Jacobian in), so no
    /// activation derivative is chained here.
    pub fn backward(&mut self, params: &[f32], grad: &mut [f32], mut d: Array2<f32>) -> Array2<f32> {
        if self.activation.is_elementwise() {
            let act = self.activation;
            d.zip_mut_with(&self.z, |d, &z| *d *= act.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad);
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params);
        d.dot(&w.t())
    }

    /// Gives a view of the raw parameter slice as this layer's weights and biases.
    fn view_params<'a>(&self, params: &'a [f32]) -> (ArrayView2<'a, f32>, ArrayView1<'a, f32>) {
        let w_size = self.size - self.dim.1;
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size]).unwrap();
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..]).unwrap();
        (weights, biases)
    }

    /// Gives a view of the raw gradient slice as this layer's delta weights
    /// and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> (ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>) {
        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).unwrap();
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).unwrap();
        (dw, db)
    }
}

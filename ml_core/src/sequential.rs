use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{loss::LossFn, optim::Optimizer, Dense, MlErr, Result, Topology};

/// A sequential stack of dense layers: information flows forward when
/// computing an output and backward when computing parameter gradients.
///
/// The stack owns no parameters; callers thread a flat `f32` buffer through
/// every operation and each layer reads its own slice of it.
#[derive(Debug, Clone)]
pub struct Sequential {
    input_dim: usize,
    layers: Vec<Dense>,
}

impl Sequential {
    /// Builds the layer stack a topology describes.
    ///
    /// # Errors
    /// `MlErr::EmptyModel` when the topology has no layers, `InvalidInput`
    /// when the input shape has zero volume.
    pub fn from_topology(topology: &Topology) -> Result<Self> {
        if topology.layers.is_empty() {
            return Err(MlErr::EmptyModel);
        }

        let input_dim = topology.input_dim();
        if input_dim == 0 {
            return Err(MlErr::InvalidInput("input shape has zero volume"));
        }

        if topology.layers.iter().any(|spec| spec.units == 0) {
            return Err(MlErr::InvalidInput("topology declares a zero-width layer"));
        }

        let mut dim_in = input_dim;
        let layers = topology
            .layers
            .iter()
            .map(|spec| {
                let layer = Dense::new((dim_in, spec.units), spec.activation);
                dim_in = spec.units;
                layer
            })
            .collect();

        Ok(Self { input_dim, layers })
    }

    /// Returns the amount of parameters in the stack.
    pub fn size(&self) -> usize {
        self.layers.iter().map(Dense::size).sum()
    }

    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Makes a forward pass through the stack.
    ///
    /// # Errors
    /// Shape mismatches between `x`, `params` and the stack.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check(params, x)?;

        let mut offset = 0;
        let mut h = x.to_owned();

        for layer in &mut self.layers {
            let size = layer.size();
            h = layer.forward(&params[offset..offset + size], h.view());
            offset += size;
        }

        Ok(h)
    }

    /// Runs one optimization step over a single mini-batch: forward, loss,
    /// backward, parameter update. Returns the batch loss.
    ///
    /// # Errors
    /// Shape mismatches between the batch, `params`, `grad` and the stack.
    pub fn train_step<L, O>(
        &mut self,
        params: &mut [f32],
        grad: &mut [f32],
        loss_fn: &L,
        optimizer: &mut O,
        x: ArrayView2<f32>,
        y: ArrayView1<f32>,
    ) -> Result<f32>
    where
        L: LossFn,
        O: Optimizer,
    {
        if grad.len() != self.size() {
            return Err(MlErr::ShapeMismatch {
                what: "gradient buffer",
                got: grad.len(),
                expected: self.size(),
            });
        }
        if y.len() != x.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        grad.fill(0.);

        let y_pred = self.forward(params, x)?;
        let loss = loss_fn.loss(y_pred.view(), y);
        let mut d = loss_fn.loss_prime(y_pred.view(), y);

        let mut offset = self.size();
        for layer in self.layers.iter_mut().rev() {
            let size = layer.size();
            offset -= size;
            d = layer.backward(
                &params[offset..offset + size],
                &mut grad[offset..offset + size],
                d,
            );
        }

        optimizer.update_params(grad, params)?;
        Ok(loss)
    }

    fn check(&self, params: &[f32], x: ArrayView2<f32>) -> Result<()> {
        if x.ncols() != self.input_dim {
            return Err(MlErr::ShapeMismatch {
                what: "input features",
                got: x.ncols(),
                expected: self.input_dim,
            });
        }
        if params.len() != self.size() {
            return Err(MlErr::ShapeMismatch {
                what: "params",
                got: params.len(),
                expected: self.size(),
            });
        }

        Ok(())
    }
}

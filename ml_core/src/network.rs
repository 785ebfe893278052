use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

use crate::{
    init::xavier_uniform, loss::LossFn, optim::Optimizer, Activation, LayerSpec, MlErr, Result,
    Sequential, Topology,
};

/// A trainable model: a topology plus the flat parameter buffer backing it.
///
/// The buffer is laid out layer by layer (weights row-major, then biases),
/// which is also the order the on-disk weight shards concatenate in.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    seq: Sequential,
    params: Vec<f32>,
}

impl Network {
    /// Wraps a topology and its parameters.
    ///
    /// # Errors
    /// `MlErr::ShapeMismatch` when the buffer length does not match the
    /// parameter count the topology implies.
    pub fn new(topology: Topology, params: Vec<f32>) -> Result<Self> {
        let seq = Sequential::from_topology(&topology)?;

        if params.len() != seq.size() {
            return Err(MlErr::ShapeMismatch {
                what: "params",
                got: params.len(),
                expected: seq.size(),
            });
        }

        Ok(Self {
            topology,
            seq,
            params,
        })
    }

    /// Builds a network with Xavier-initialized weights and zero biases.
    pub fn random<R: Rng>(topology: Topology, rng: &mut R) -> Result<Self> {
        let mut params = Vec::with_capacity(topology.num_params());
        let mut dim_in = topology.input_dim();

        for layer in &topology.layers {
            params.extend(xavier_uniform(rng, dim_in, layer.units, dim_in * layer.units)?);
            params.extend(std::iter::repeat(0.).take(layer.units));
            dim_in = layer.units;
        }

        Self::new(topology, params)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    /// Returns the amount of parameters in the network.
    pub fn size(&self) -> usize {
        self.seq.size()
    }

    pub fn num_layers(&self) -> usize {
        self.seq.num_layers()
    }

    pub fn output_dim(&self) -> Option<usize> {
        self.topology.output_dim()
    }

    /// Swaps the output layer for a fresh softmax classification head.
    ///
    /// The base parameters are kept untouched; the old head occupies the
    /// tail of the flat buffer, so it is truncated away and the new head's
    /// Xavier-initialized weights (zero biases) are appended.
    ///
    /// # Errors
    /// `MlErr::EmptyModel` when there is no layer to replace, shape errors
    /// when the remaining stack exposes no feature width.
    pub fn replace_head<R: Rng>(&mut self, num_classes: usize, rng: &mut R) -> Result<()> {
        let old = *self.topology.layers.last().ok_or(MlErr::EmptyModel)?;

        let nlayers = self.topology.layers.len();
        let feature_dim = if nlayers >= 2 {
            self.topology.layers[nlayers - 2].units
        } else {
            self.topology.input_dim()
        };

        if feature_dim == 0 {
            return Err(MlErr::ShapeMismatch {
                what: "feature width",
                got: 0,
                expected: 1,
            });
        }
        if num_classes == 0 {
            return Err(MlErr::InvalidInput("head needs at least one class"));
        }

        let old_head = (feature_dim + 1) * old.units;
        self.params.truncate(self.params.len() - old_head);
        self.params
            .extend(xavier_uniform(rng, feature_dim, num_classes, feature_dim * num_classes)?);
        self.params.extend(std::iter::repeat(0.).take(num_classes));

        self.topology.layers.pop();
        self.topology.layers.push(LayerSpec {
            units: num_classes,
            activation: Activation::Softmax,
        });
        self.seq = Sequential::from_topology(&self.topology)?;

        Ok(())
    }

    /// Forwards a flattened batch through the network.
    pub fn forward(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.seq.forward(&self.params, x)
    }

    /// Runs one optimization step over a mini-batch and returns its loss.
    pub fn train_step<L, O>(
        &mut self,
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
        self.seq
            .train_step(&mut self.params, grad, loss_fn, optimizer, x, y)
    }

    /// Returns the predicted class index for every sample in the batch.
    pub fn predict(&mut self, x: ArrayView2<f32>) -> Result<Vec<usize>> {
        let probs = self.forward(x)?;
        Ok(probs.rows().into_iter().map(argmax).collect())
    }

    /// Fraction of samples whose predicted class matches the label.
    pub fn accuracy(&mut self, x: ArrayView2<f32>, y: ArrayView1<f32>) -> Result<f32> {
        if y.len() != x.nrows() {
            return Err(MlErr::ShapeMismatch {
                what: "labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }
        if y.is_empty() {
            return Err(MlErr::InvalidInput("cannot score an empty batch"));
        }

        let n = y.len();
        let predicted = self.predict(x)?;
        let hits = predicted
            .iter()
            .zip(y.iter())
            .filter(|(&p, &label)| p == label as usize)
            .count();

        Ok(hits as f32 / n as f32)
    }
}

fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    let mut best_value = f32::NEG_INFINITY;

    for (i, &v) in row.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }

    best
}

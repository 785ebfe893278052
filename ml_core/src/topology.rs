use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// Activation attached to a dense layer.
///
/// `Softmax` is only meaningful on the output layer, where its Jacobian is
/// folded into the cross-entropy loss (see `loss.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
    Softmax,
}

/// One dense layer as declared in a topology document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub units: usize,
    pub activation: Activation,
}

/// The on-disk model description (`model.json`).
///
/// Parameters are not part of the topology; they live in a flat `f32`
/// buffer laid out layer by layer, weights row-major then biases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub name: String,
    pub input_shape: Vec<usize>,
    pub layers: Vec<LayerSpec>,
}

impl Topology {
    /// Returns the flattened input width (product of the input shape).
    pub fn input_dim(&self) -> usize {
        self.input_shape.iter().product()
    }

    /// Returns the width of the output layer, if any layer exists.
    pub fn output_dim(&self) -> Option<usize> {
        self.layers.last().map(|layer| layer.units)
    }

    /// Returns the total number of scalar parameters the topology implies.
    pub fn num_params(&self) -> usize {
        let mut dim_in = self.input_dim();
        let mut total = 0;

        for layer in &self.layers {
            total += (dim_in + 1) * layer.units;
            dim_in = layer.units;
        }

        total
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let topology: Self = serde_json::from_str(text)?;

        if topology.layers.iter().any(|layer| layer.units == 0) {
            return Err(MlErr::InvalidInput("topology declares a zero-width layer"));
        }

        Ok(topology)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

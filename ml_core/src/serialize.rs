use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Network, Result, Topology};

/// Reinterprets a parameter buffer as little-endian bytes, the layout the
/// weight shards use on disk.
pub fn params_to_bytes(params: &[f32]) -> Vec<u8> {
    bytemuck::cast_slice(params).to_vec()
}

/// Decodes a little-endian byte buffer back into parameters.
///
/// # Errors
/// `MlErr::WeightDecode` when the length is not a multiple of four.
pub fn params_from_bytes(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(MlErr::WeightDecode(format!(
            "byte length {} is not a whole number of f32s",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// The single-string model artifact reported alongside the accuracy:
/// the topology as a nested JSON string plus the weights as one base64 blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedModel {
    pub topology: String,
    pub weights: String,
}

impl SerializedModel {
    pub fn from_network(network: &Network) -> Result<Self> {
        Ok(Self {
            topology: network.topology().to_json()?,
            weights: STANDARD.encode(params_to_bytes(network.params())),
        })
    }

    /// Rebuilds a network from the serialized form.
    ///
    /// # Errors
    /// Decode failures, or a weight count that does not match the topology.
    pub fn to_network(&self) -> Result<Network> {
        let topology = Topology::from_json(&self.topology)?;
        let bytes = STANDARD
            .decode(&self.weights)
            .map_err(|e| MlErr::WeightDecode(e.to_string()))?;
        let params = params_from_bytes(&bytes)?;

        Network::new(topology, params)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

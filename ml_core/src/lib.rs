mod activation;
mod dense;
mod error;
mod init;
mod loss;
mod network;
mod optim;
mod sequential;
mod serialize;
mod topology;

pub use dense::Dense;
pub use error::{MlErr, Result};
pub use init::xavier_uniform;
pub use loss::{LossFn, SoftmaxCrossEntropy};
pub use network::Network;
pub use optim::{Adam, GradientDescent, Optimizer};
pub use sequential::Sequential;
pub use serialize::{params_from_bytes, params_to_bytes, SerializedModel};
pub use topology::{Activation, LayerSpec, Topology};

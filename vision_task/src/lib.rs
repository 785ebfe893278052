pub mod artifact;
pub mod config;
pub mod data;
pub mod error;
pub mod fetch;
pub mod http;
pub mod round;
pub mod store;
pub mod train;

pub use config::TaskConfig;
pub use error::{Result, TaskErr};
pub use fetch::ModelFetcher;
pub use http::{HttpClient, HttpError, ReqwestClient};
pub use round::{RoundController, RoundResult, ACCURACY_KEY, ERROR_MARKER};
pub use store::{KeyValueStore, MemoryStore};
pub use train::{FineTuner, TrainOutcome};

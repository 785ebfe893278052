mod batch;
mod loader;
mod metadata;

pub use batch::TrainingBatch;
pub use loader::DatasetLoader;
pub use metadata::{label_for, parse_manifest, DatasetRecord};

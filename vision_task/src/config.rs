use std::{num::NonZeroUsize, path::PathBuf};

/// Deployment constants for one pipeline, read once at construction instead
/// of scattered through the code.
#[derive(Debug, Clone)]
pub struct TaskConfig {
    /// Directory holding `model.json` and the weight shards.
    pub model_dir: PathBuf,
    /// Base URL the topology and shards download from.
    pub model_base_url: String,
    /// URL of the CSV dataset manifest.
    pub manifest_url: String,
    /// Base URL the per-record images download from.
    pub dataset_base_url: String,
    /// Number of weight shard files the remote host serves.
    pub num_shards: NonZeroUsize,
    /// Width of the replacement classification head.
    pub num_classes: usize,
    /// The diagnosis code that maps to label 1; everything else maps to 0.
    pub positive_label: String,
    /// Images are resized to `image_side` x `image_side` x 3.
    pub image_side: usize,
    pub epochs: usize,
    pub batch_size: NonZeroUsize,
    /// Fraction of the batch held out (last samples in input order).
    pub validation_split: f32,
    pub learning_rate: f32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("model"),
            model_base_url: "https://github.com/eviangel/Koiivision/raw/main/model/".into(),
            manifest_url: "https://github.com/eviangel/Koiivision/raw/main/dataset/metadata.csv"
                .into(),
            dataset_base_url: "https://github.com/eviangel/Koiivision/raw/main/dataset/".into(),
            num_shards: NonZeroUsize::new(37).unwrap(),
            num_classes: 3,
            positive_label: "bkl".into(),
            image_side: 224,
            epochs: 10,
            batch_size: NonZeroUsize::new(32).unwrap(),
            validation_split: 0.2,
            learning_rate: 1e-3,
        }
    }
}

use log::{debug, info, warn};

use crate::{
    config::TaskConfig,
    data::DatasetLoader,
    error::Result,
    fetch::ModelFetcher,
    http::HttpClient,
    store::KeyValueStore,
    train::{FineTuner, TrainOutcome},
};

/// Store key the accuracy is persisted under. Round-independent: each round
/// overwrites the previous value.
pub const ACCURACY_KEY: &str = "accuracy";

/// Marker prefixing the error string a failed round reports.
pub const ERROR_MARKER: &str = "ERROR IN EXECUTING TASK";

/// What one round reports back to the harness.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundResult {
    Accuracy(f32),
    Error(String),
}

/// Sequences one round's pipeline (fetch, adapt, load, fine-tune) and is
/// the outermost error boundary: nothing escapes `task` as an error.
pub struct RoundController<C, S> {
    config: TaskConfig,
    client: C,
    store: S,
}

impl<C: HttpClient, S: KeyValueStore> RoundController<C, S> {
    pub fn new(config: TaskConfig, client: C, store: S) -> Self {
        Self {
            config,
            client,
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one round. A nonzero accuracy is persisted under
    /// [`ACCURACY_KEY`]; every failure is converted into a marker-prefixed
    /// error string instead of propagating.
    pub async fn task(&self, round: u64) -> RoundResult {
        info!("round {round}");

        match self.run_round().await {
            Ok(TrainOutcome::Trained { accuracy, .. }) => {
                if accuracy > 0. {
                    self.store.set(ACCURACY_KEY, accuracy.to_string());
                }
                RoundResult::Accuracy(accuracy)
            }
            Ok(TrainOutcome::Failed { reason }) => {
                warn!("round {round} training failed: {reason}");
                RoundResult::Error(format!("{ERROR_MARKER}: {reason}"))
            }
            Err(e) => {
                warn!("round {round} failed: {e}");
                RoundResult::Error(format!("{ERROR_MARKER}: {e}"))
            }
        }
    }

    /// Returns the value the submission step should report for `round`.
    pub fn submit_task(&self, round: u64) -> Option<String> {
        let value = self.fetch_submission(round);

        match &value {
            Some(v) => info!("submitting accuracy {v} for round {round}"),
            None => warn!("no stored accuracy for round {round}"),
        }

        value
    }

    /// Reads back the accuracy persisted by `task`.
    pub fn fetch_submission(&self, round: u64) -> Option<String> {
        debug!("fetching submission for round {round}");
        self.store.get(ACCURACY_KEY)
    }

    async fn run_round(&self) -> Result<TrainOutcome> {
        let fetcher = ModelFetcher::new(&self.client, &self.config);
        let mut network = fetcher.load_or_download().await?;

        let mut rng = rand::rng();
        network.replace_head(self.config.num_classes, &mut rng)?;
        info!("adapted model head to {} classes", self.config.num_classes);

        let loader = DatasetLoader::new(&self.client, &self.config);
        let records = loader.load_metadata().await?;
        info!("manifest yielded {} records", records.len());

        let batch = loader.load_images(&records).await?;
        info!("assembled batch of {} images", batch.len());

        let tuner = FineTuner::new(&self.config);
        Ok(tuner.fine_tune(&mut network, &batch))
    }
}

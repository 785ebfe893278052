use std::{num::NonZeroUsize, path::PathBuf};

use log::{debug, info};
use ml_core::{params_from_bytes, Network, Topology};
use tokio::fs;

use crate::{
    artifact::{self, shard_file_name, TOPOLOGY_FILE},
    config::TaskConfig,
    error::{Result, TaskErr},
    http::HttpClient,
};

/// Acquires the base model: loads it from the local model directory when a
/// complete copy exists, otherwise downloads the topology plus every weight
/// shard, persists them, and loads the result.
pub struct ModelFetcher<'a, C> {
    client: &'a C,
    model_dir: PathBuf,
    base_url: String,
    num_shards: NonZeroUsize,
}

impl<'a, C: HttpClient> ModelFetcher<'a, C> {
    pub fn new(client: &'a C, config: &TaskConfig) -> Self {
        Self {
            client,
            model_dir: config.model_dir.clone(),
            base_url: config.model_base_url.clone(),
            num_shards: config.num_shards,
        }
    }

    /// Returns the base model, downloading it first when absent.
    ///
    /// Calling this twice against a complete local directory performs zero
    /// network requests.
    ///
    /// # Errors
    /// `TaskErr::Download` on any failed fetch (partial downloads are left
    /// on disk), `TaskErr::LocalLoad` when a present copy is corrupt.
    pub async fn load_or_download(&self) -> Result<Network> {
        if artifact::is_model_present(&self.model_dir).await {
            info!("model found locally, loading");
            return self.load_local().await;
        }

        info!("model not found locally, downloading");
        self.download().await?;
        self.load_local().await
    }

    async fn download(&self) -> Result<()> {
        let url = format!("{}{}", self.base_url, TOPOLOGY_FILE);
        let body = self
            .client
            .get(&url)
            .await
            .map_err(|source| TaskErr::Download {
                resource: url.clone(),
                source,
            })?;

        fs::create_dir_all(&self.model_dir).await?;
        fs::write(self.model_dir.join(TOPOLOGY_FILE), &body).await?;
        debug!("topology saved to {}", self.model_dir.display());

        let total = self.num_shards.get();
        for i in 1..=total {
            let name = shard_file_name(i, total);
            let url = format!("{}{}", self.base_url, name);

            let body = self
                .client
                .get(&url)
                .await
                .map_err(|source| TaskErr::Download {
                    resource: format!("shard {i} ({url})"),
                    source,
                })?;

            fs::write(self.model_dir.join(&name), &body).await?;
            debug!("shard {i}/{total} saved");
        }

        Ok(())
    }

    /// Loads topology and shards from the model directory. Every decode
    /// failure is a `LocalLoad` error: corruption repair is not attempted.
    async fn load_local(&self) -> Result<Network> {
        let topology_path = self.model_dir.join(TOPOLOGY_FILE);
        let text =
            fs::read_to_string(&topology_path)
                .await
                .map_err(|e| TaskErr::LocalLoad {
                    path: topology_path.clone(),
                    detail: e.to_string(),
                })?;
        let topology = Topology::from_json(&text).map_err(|e| TaskErr::LocalLoad {
            path: topology_path,
            detail: e.to_string(),
        })?;

        let total = self.num_shards.get();
        let mut bytes = Vec::new();

        for i in 1..=total {
            let path = self.model_dir.join(shard_file_name(i, total));
            let shard = fs::read(&path).await.map_err(|e| TaskErr::LocalLoad {
                path: path.clone(),
                detail: e.to_string(),
            })?;
            bytes.extend_from_slice(&shard);
        }

        let params = params_from_bytes(&bytes).map_err(|e| TaskErr::LocalLoad {
            path: self.model_dir.clone(),
            detail: e.to_string(),
        })?;

        let network = Network::new(topology, params).map_err(|e| TaskErr::LocalLoad {
            path: self.model_dir.clone(),
            detail: e.to_string(),
        })?;

        info!(
            "loaded model with {} layers and {} params",
            network.num_layers(),
            network.size()
        );
        Ok(network)
    }
}

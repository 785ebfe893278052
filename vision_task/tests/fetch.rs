mod common;

use std::num::NonZeroUsize;
use std::path::Path;

use common::{base_network, shard_bodies, FakeClient};
use vision_task::{ModelFetcher, TaskConfig, TaskErr};

const BASE_URL: &str = "http://models.test/";

fn config(model_dir: &Path, num_shards: usize) -> TaskConfig {
    TaskConfig {
        model_dir: model_dir.to_path_buf(),
        model_base_url: BASE_URL.into(),
        num_shards: NonZeroUsize::new(num_shards).unwrap(),
        image_side: 4,
        ..TaskConfig::default()
    }
}

/// Wires every model route into a fake client.
fn client_with_model(num_shards: usize) -> FakeClient {
    let network = base_network(4, 11);
    let (topology, shards) = shard_bodies(&network, num_shards);
    assert_eq!(shards.len(), num_shards);

    let mut client = FakeClient::new().route(&format!("{BASE_URL}model.json"), topology);
    for (i, shard) in shards.into_iter().enumerate() {
        let url = format!("{BASE_URL}group1-shard{}of{num_shards}.bin", i + 1);
        client = client.route(&url, shard);
    }

    client
}

#[tokio::test]
async fn downloads_and_persists_the_model() {
    common::init_logs();
    let dir = tempfile::tempdir().unwrap();
    let client = client_with_model(3);
    let config = config(dir.path(), 3);

    let fetcher = ModelFetcher::new(&client, &config);
    let network = fetcher.load_or_download().await.unwrap();

    assert_eq!(network.num_layers(), 1);
    assert_eq!(network.output_dim(), Some(4));

    assert!(dir.path().join("model.json").exists());
    for i in 1..=3 {
        assert!(dir.path().join(format!("group1-shard{i}of3.bin")).exists());
    }
}

#[tokio::test]
async fn second_call_performs_no_network_requests() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_with_model(3);
    let config = config(dir.path(), 3);

    let fetcher = ModelFetcher::new(&client, &config);
    fetcher.load_or_download().await.unwrap();
    let after_download = client.request_count();
    assert_eq!(after_download, 4); // topology + 3 shards

    fetcher.load_or_download().await.unwrap();
    assert_eq!(client.request_count(), after_download);
}

#[tokio::test]
async fn missing_shard_aborts_and_keeps_earlier_shards() {
    let dir = tempfile::tempdir().unwrap();

    let network = base_network(4, 11);
    let (topology, shards) = shard_bodies(&network, 3);

    // Shard 3 is never routed: the host answers 404 for it.
    let client = FakeClient::new()
        .route(&format!("{BASE_URL}model.json"), topology)
        .route(&format!("{BASE_URL}group1-shard1of3.bin"), shards[0].clone())
        .route(&format!("{BASE_URL}group1-shard2of3.bin"), shards[1].clone());

    let config = config(dir.path(), 3);
    let fetcher = ModelFetcher::new(&client, &config);

    match fetcher.load_or_download().await {
        Err(TaskErr::Download { resource, .. }) => {
            assert!(resource.contains("shard 3"), "got resource: {resource}");
        }
        other => panic!("expected a download failure, got {other:?}"),
    }

    // No rollback: what was already written stays on disk.
    assert!(dir.path().join("model.json").exists());
    assert!(dir.path().join("group1-shard1of3.bin").exists());
    assert!(dir.path().join("group1-shard2of3.bin").exists());
    assert!(!dir.path().join("group1-shard3of3.bin").exists());
}

#[tokio::test]
async fn corrupt_local_topology_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("model.json"), b"not json at all").unwrap();
    std::fs::write(dir.path().join("group1-shard1of1.bin"), b"\0\0\0\0").unwrap();

    let client = FakeClient::new();
    let config = config(dir.path(), 1);
    let fetcher = ModelFetcher::new(&client, &config);

    assert!(matches!(
        fetcher.load_or_download().await,
        Err(TaskErr::LocalLoad { .. })
    ));
    // The presence check short-circuits the download: no requests were made.
    assert_eq!(client.request_count(), 0);
}

#[tokio::test]
async fn shard_count_mismatch_is_a_local_load_failure() {
    let dir = tempfile::tempdir().unwrap();

    let network = base_network(4, 11);
    std::fs::write(
        dir.path().join("model.json"),
        network.topology().to_json().unwrap(),
    )
    .unwrap();
    // A single truncated shard cannot back the declared topology.
    std::fs::write(dir.path().join("group1-shard1of1.bin"), vec![0u8; 8]).unwrap();

    let client = FakeClient::new();
    let config = config(dir.path(), 1);
    let fetcher = ModelFetcher::new(&client, &config);

    match fetcher.load_or_download().await {
        Err(TaskErr::LocalLoad { detail, .. }) => {
            assert!(detail.contains("shape mismatch"), "got detail: {detail}");
        }
        other => panic!("expected a local load failure, got {other:?}"),
    }
}

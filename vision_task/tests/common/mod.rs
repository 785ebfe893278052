use std::collections::HashMap;
use std::io::Cursor;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};
use ml_core::{params_to_bytes, Activation, LayerSpec, Network, Topology};
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use vision_task::{HttpClient, HttpError};

/// Routes test logs through the usual facade; safe to call repeatedly.
pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory HTTP fake: canned bodies per URL, anything else answers 404,
/// and every request is recorded for idempotence assertions.
#[derive(Default)]
pub struct FakeClient {
    routes: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, body: Vec<u8>) -> Self {
        self.routes.insert(url.to_string(), body);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpClient for FakeClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        self.requests.lock().push(url.to_string());

        match self.routes.get(url) {
            Some(body) => Ok(body.clone()),
            None => Err(HttpError::Status { code: 404 }),
        }
    }
}

/// A tiny base model whose input matches `side` x `side` x 3 images.
pub fn base_network(side: usize, seed: u64) -> Network {
    let topology = Topology {
        name: "feature-net".into(),
        input_shape: vec![side, side, 3],
        layers: vec![LayerSpec {
            units: 4,
            activation: Activation::Softmax,
        }],
    };

    let mut rng = StdRng::seed_from_u64(seed);
    Network::random(topology, &mut rng).unwrap()
}

/// Splits a network into the topology document plus `num_shards` weight
/// shard bodies, the way the remote model host serves them.
pub fn shard_bodies(network: &Network, num_shards: usize) -> (Vec<u8>, Vec<Vec<u8>>) {
    let topology = network.topology().to_json().unwrap().into_bytes();

    let bytes = params_to_bytes(network.params());
    let chunk = bytes.len().div_ceil(num_shards);
    let shards = bytes.chunks(chunk).map(<[u8]>::to_vec).collect();

    (topology, shards)
}

pub fn jpeg_bytes(side: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(side, side, Rgb(rgb));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

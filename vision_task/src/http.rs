use std::{error::Error, fmt};

use async_trait::async_trait;

/// A GET that reached the server but was refused, or never got through.
#[derive(Debug)]
pub enum HttpError {
    Status { code: u16 },
    Transport(String),
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Status { code } => write!(f, "http status {code}"),
            HttpError::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl Error for HttpError {}

/// The fetching capability handed to every component that touches the
/// network. Swapping in an in-memory fake makes the whole pipeline
/// deterministic under test.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetches `url`, returning the response body for a successful status.
    async fn get(&self, url: &str) -> std::result::Result<Vec<u8>, HttpError>;
}

/// Production client backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> std::result::Result<Vec<u8>, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        Ok(body.to_vec())
    }
}

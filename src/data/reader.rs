// src/data/reader.rs
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Read access to the movie/actor data layer.
#[async_trait]
pub trait DataReader: Send + Sync {
    /// Read the resource at `path`, with `query` appended when non-empty.
    async fn read<T>(&self, path: &str, query: &str) -> Result<T, DataError>
    where
        T: DeserializeOwned + Send + 'static;
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data service returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid request path: {0}")]
    InvalidPath(#[from] url::ParseError),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

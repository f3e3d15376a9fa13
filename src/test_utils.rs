//! Stub `DataReader` shared by unit tests.
#![cfg(test)]

use crate::data::{DataError, DataReader};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Canned response for one path.
enum Canned {
    Body(Value),
    NotFound,
    Unavailable(u16),
}

/// Serves canned JSON per path after a fixed delay. Unknown paths are not found.
pub struct StubReader {
    routes: HashMap<String, (Duration, Canned)>,
    calls: AtomicUsize,
}

impl StubReader {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(mut self, path: &str, delay: Duration, body: Value) -> Self {
        self.routes.insert(path.to_string(), (delay, Canned::Body(body)));
        self
    }

    pub fn not_found(mut self, path: &str, delay: Duration) -> Self {
        self.routes.insert(path.to_string(), (delay, Canned::NotFound));
        self
    }

    pub fn unavailable(mut self, path: &str, status: u16) -> Self {
        self.routes
            .insert(path.to_string(), (Duration::ZERO, Canned::Unavailable(status)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataReader for StubReader {
    async fn read<T>(&self, path: &str, _query: &str) -> Result<T, DataError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some((delay, canned)) = self.routes.get(path) else {
            return Err(DataError::NotFound(path.to_string()));
        };

        tokio::time::sleep(*delay).await;

        match canned {
            Canned::Body(body) => Ok(serde_json::from_value(body.clone())?),
            Canned::NotFound => Err(DataError::NotFound(path.to_string())),
            Canned::Unavailable(status) => Err(DataError::Status {
                status: *status,
                path: path.to_string(),
            }),
        }
    }
}

pub fn movie_json(id: &str) -> Value {
    serde_json::json!({ "movieId": id, "title": "The Matrix", "year": 1999 })
}

pub fn actor_json(id: &str) -> Value {
    serde_json::json!({ "actorId": id, "name": "Nicole Kidman" })
}

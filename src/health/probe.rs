// src/health/probe.rs
use super::check::HealthzCheck;
use crate::data::{Actor, DataError, DataReader, Movie};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Probe results keyed by `<probeName>:responseTime`.
pub type ResultMap = HashMap<String, HealthzCheck>;

pub const RESULT_KEY_SUFFIX: &str = ":responseTime";

pub fn result_key(name: &str) -> String {
    format!("{}{}", name, RESULT_KEY_SUFFIX)
}

// Per-invocation timer
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// What to probe: the request path, its latency target, and the name the
/// result is recorded under. Unnamed probes are never recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    pub name: Option<String>,
    pub path: String,
    pub target: Duration,
}

impl Probe {
    pub fn new(name: impl Into<String>, path: impl Into<String>, target: Duration) -> Self {
        Self {
            name: Some(name.into()),
            path: path.into(),
            target,
        }
    }

    pub fn unnamed(path: impl Into<String>, target: Duration) -> Self {
        Self {
            name: None,
            path: path.into(),
            target,
        }
    }

    pub fn genres(limit: Duration) -> Self {
        Self::new("getGenres", "/api/genres", limit)
    }

    pub fn movie_by_id(movie_id: &str, limit: Duration) -> Self {
        Self::new("getMovieById", format!("/api/movies/{}", movie_id), limit / 2)
    }

    pub fn search_movies(query: &str, limit: Duration) -> Self {
        Self::new("searchMovies", format!("/api/movies?q={}", query), limit)
    }

    pub fn actor_by_id(actor_id: &str, limit: Duration) -> Self {
        Self::new("getActorById", format!("/api/actors/{}", actor_id), limit / 2)
    }

    pub fn search_actors(query: &str, limit: Duration) -> Self {
        Self::new("searchActors", format!("/api/actors?q={}", query), limit)
    }

    fn record(&self, results: Option<&mut ResultMap>, check: &HealthzCheck) {
        match (results, self.name.as_deref()) {
            (Some(results), Some(name)) if !name.is_empty() => {
                results.insert(result_key(name), check.clone());
            }
            _ => {}
        }
    }
}

/// A probe whose read failed. Carries the recorded result alongside the
/// untouched error from the data layer.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ProbeFailure {
    pub check: HealthzCheck,
    pub error: DataError,
}

impl ProbeFailure {
    pub fn into_error(self) -> DataError {
        self.error
    }
}

/// Times single reads against the data layer and classifies them.
pub struct ProbeRunner<R> {
    reader: Arc<R>,
    max_response_time: Duration,
}

impl<R> Clone for ProbeRunner<R> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            max_response_time: self.max_response_time,
        }
    }
}

impl<R: DataReader> ProbeRunner<R> {
    pub fn new(reader: Arc<R>, max_response_time: Duration) -> Self {
        Self {
            reader,
            max_response_time,
        }
    }

    pub fn max_response_time(&self) -> Duration {
        self.max_response_time
    }

    /// Run one probe, reading the response as `T`.
    ///
    /// The result is recorded into `results` when both the map and the probe
    /// name are present, whether the read succeeded or not.
    pub async fn run<T>(
        &self,
        probe: &Probe,
        results: Option<&mut ResultMap>,
    ) -> Result<HealthzCheck, ProbeFailure>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let stopwatch = Stopwatch::start();
        let outcome: Result<T, DataError> = self.reader.read(&probe.path, "").await;
        let elapsed = stopwatch.elapsed();

        match outcome {
            Ok(_) => {
                let check = HealthzCheck::classify(
                    probe.path.clone(),
                    probe.name.as_deref(),
                    elapsed,
                    probe.target,
                    None,
                );

                if check.message.is_some() {
                    warn!(
                        endpoint = %probe.path,
                        ?elapsed,
                        limit = ?probe.target,
                        "probe exceeded target duration"
                    );
                } else {
                    debug!(endpoint = %probe.path, ?elapsed, "probe healthy");
                }

                probe.record(results, &check);
                Ok(check)
            }
            Err(error) => {
                let check = HealthzCheck::classify(
                    probe.path.clone(),
                    probe.name.as_deref(),
                    elapsed,
                    probe.target,
                    Some(error.to_string()),
                );

                probe.record(results, &check);
                Err(ProbeFailure { check, error })
            }
        }
    }

    pub async fn get_genres(
        &self,
        results: Option<&mut ResultMap>,
    ) -> Result<HealthzCheck, ProbeFailure> {
        let probe = Probe::genres(self.max_response_time);
        self.run::<Vec<String>>(&probe, results).await
    }

    pub async fn get_movie_by_id(
        &self,
        movie_id: &str,
        results: Option<&mut ResultMap>,
    ) -> Result<HealthzCheck, ProbeFailure> {
        let probe = Probe::movie_by_id(movie_id, self.max_response_time);
        self.run::<Movie>(&probe, results).await
    }

    pub async fn search_movies(
        &self,
        query: &str,
        results: Option<&mut ResultMap>,
    ) -> Result<HealthzCheck, ProbeFailure> {
        let probe = Probe::search_movies(query, self.max_response_time);
        self.run::<Vec<Movie>>(&probe, results).await
    }

    pub async fn get_actor_by_id(
        &self,
        actor_id: &str,
        results: Option<&mut ResultMap>,
    ) -> Result<HealthzCheck, ProbeFailure> {
        let probe = Probe::actor_by_id(actor_id, self.max_response_time);
        self.run::<Actor>(&probe, results).await
    }

    pub async fn search_actors(
        &self,
        query: &str,
        results: Option<&mut ResultMap>,
    ) -> Result<HealthzCheck, ProbeFailure> {
        let probe = Probe::search_actors(query, self.max_response_time);
        self.run::<Vec<Actor>>(&probe, results).await
    }
}

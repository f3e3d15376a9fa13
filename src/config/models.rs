// src/config/models.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub data_service: DataServiceConfig,
    #[serde(default)]
    pub probes: ProbeConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        match self.data_service.base_url.scheme() {
            "http" | "https" => {}
            other => bail!("data_service.base_url must be http or https, got {}", other),
        }

        if self.data_service.timeout_secs == 0 {
            bail!("data_service.timeout_secs must be greater than zero");
        }

        if self.probes.max_response_time_ms == 0 {
            bail!("probes.max_response_time_ms must be greater than zero");
        }

        for (field, value) in [
            ("probes.movie_id", &self.probes.movie_id),
            ("probes.actor_id", &self.probes.actor_id),
            ("probes.movie_query", &self.probes.movie_query),
            ("probes.actor_query", &self.probes.actor_query),
        ] {
            if value.trim().is_empty() {
                bail!("{} must not be empty", field);
            }
        }

        if self.metrics.enabled {
            if self.metrics.port == self.server.port {
                bail!("metrics.port must differ from server.port");
            }
            if !self.metrics.path.starts_with('/') {
                bail!("metrics.path must start with '/'");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_service_id")]
    pub service_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            service_id: default_service_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataServiceConfig {
    pub base_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl DataServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parameters fed to the datastore probes on every health run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_max_response_time_ms")]
    pub max_response_time_ms: u64,
    #[serde(default = "default_movie_id")]
    pub movie_id: String,
    #[serde(default = "default_actor_id")]
    pub actor_id: String,
    #[serde(default = "default_movie_query")]
    pub movie_query: String,
    #[serde(default = "default_actor_query")]
    pub actor_query: String,
}

impl ProbeConfig {
    pub fn max_response_time(&self) -> Duration {
        Duration::from_millis(self.max_response_time_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_response_time_ms: default_max_response_time_ms(),
            movie_id: default_movie_id(),
            actor_id: default_actor_id(),
            movie_query: default_movie_query(),
            actor_query: default_actor_query(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
            path: default_metrics_path(),
        }
    }
}

fn default_server_port() -> u16 {
    8080
}

fn default_service_id() -> String {
    "datastore-healthz".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_response_time_ms() -> u64 {
    200
}

fn default_movie_id() -> String {
    "tt0133093".to_string()
}

fn default_actor_id() -> String {
    "nm0000173".to_string()
}

fn default_movie_query() -> String {
    "ring".to_string()
}

fn default_actor_query() -> String {
    "nicole".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

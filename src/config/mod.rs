// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&contents, path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(contents).context("Failed to parse JSON config")?,
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_by_extension() {
        let json = r#"{
            "data_service": { "base_url": "http://data:4122", "timeout_secs": 3 },
            "probes": { "max_response_time_ms": 400 }
        }"#;

        let config = parse_config(json, Path::new("healthz.json")).unwrap();
        assert_eq!(config.data_service.timeout_secs, 3);
        assert_eq!(config.probes.max_response_time_ms, 400);
        assert_eq!(config.probes.actor_query, "nicole");
    }

    #[test]
    fn test_parse_yaml_by_extension() {
        let yaml = r#"
server:
  port: 4120
data_service:
  base_url: "https://data.example.com"
metrics:
  enabled: true
"#;

        let config = parse_config(yaml, Path::new("healthz.yml")).unwrap();
        assert_eq!(config.server.port, 4120);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let err = load_config("/nonexistent/healthz.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

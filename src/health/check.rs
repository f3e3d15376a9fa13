// src/health/check.rs
use super::status::HealthStatus;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Dependency category reported by every datastore probe.
pub const COMPONENT_TYPE: &str = "datastore";

/// Message attached to probes that answered but too slowly.
pub const TIMEOUT_MESSAGE: &str = "Request exceeded expected duration";

/// Outcome of a single probe invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthzCheck {
    pub endpoint: String,
    pub status: HealthStatus,
    pub duration: Duration,
    pub target_duration: Duration,
    pub component_id: Option<String>,
    pub component_type: &'static str,
    pub message: Option<String>,
    pub time: DateTime<Utc>,
}

impl HealthzCheck {
    /// Classify a finished call. A failure always wins over a slow response.
    pub fn classify(
        endpoint: impl Into<String>,
        component_id: Option<&str>,
        duration: Duration,
        target_duration: Duration,
        failure: Option<String>,
    ) -> Self {
        let (status, message) = match failure {
            Some(error) => (HealthStatus::Unhealthy, Some(error)),
            None if duration > target_duration => {
                (HealthStatus::Degraded, Some(TIMEOUT_MESSAGE.to_string()))
            }
            None => (HealthStatus::Healthy, None),
        };

        Self {
            endpoint: endpoint.into(),
            status,
            duration,
            target_duration,
            component_id: component_id.map(str::to_string),
            component_type: COMPONENT_TYPE,
            message,
            time: Utc::now(),
        }
    }
}

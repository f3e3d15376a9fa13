// src/health/status.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probe outcome, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Worst status of the set; `Healthy` when empty.
    pub fn worst<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = HealthStatus>,
    {
        statuses
            .into_iter()
            .max()
            .unwrap_or(HealthStatus::Healthy)
    }

    /// IETF health-check wording.
    pub fn as_ietf(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "pass",
            HealthStatus::Degraded => "warn",
            HealthStatus::Unhealthy => "fail",
        }
    }

    pub fn is_failing(&self) -> bool {
        *self == HealthStatus::Unhealthy
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Degraded => "Degraded",
            HealthStatus::Unhealthy => "Unhealthy",
        };
        f.write_str(name)
    }
}

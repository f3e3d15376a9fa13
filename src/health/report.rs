// src/health/report.rs
use super::check::HealthzCheck;
use super::probe::ResultMap;
use super::status::HealthStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Aggregated outcome of one health run.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub duration: Duration,
    pub started_at: DateTime<Utc>,
    pub checks: ResultMap,
}

impl HealthReport {
    pub fn new(checks: ResultMap, duration: Duration, started_at: DateTime<Utc>) -> Self {
        let status = HealthStatus::worst(checks.values().map(|c| c.status));
        Self {
            status,
            duration,
            started_at,
            checks,
        }
    }

    /// Body of the plain `/healthz` endpoint.
    pub fn to_text(&self) -> &'static str {
        self.status.as_ietf()
    }

    pub fn to_ietf(&self, service: &ServiceInfo) -> IetfHealth {
        // BTreeMap keeps the rendered checks in a stable order
        let checks = self
            .checks
            .iter()
            .map(|(key, check)| (key.clone(), vec![IetfCheck::from(check)]))
            .collect::<BTreeMap<_, _>>();

        IetfHealth {
            status: self.status.as_ietf(),
            service_id: service.service_id.clone(),
            description: service.description.clone(),
            instance: service.instance.clone(),
            version: service.version.clone(),
            time: self.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            checks,
        }
    }
}

/// Identity fields stamped on the IETF document.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub service_id: String,
    pub description: String,
    pub instance: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            description: "Datastore health check".to_string(),
            instance: uuid::Uuid::new_v4().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IetfHealth {
    pub status: &'static str,
    pub service_id: String,
    pub description: String,
    pub instance: String,
    pub version: String,
    pub time: String,
    pub checks: BTreeMap<String, Vec<IetfCheck>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IetfCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<String>,
    pub component_type: &'static str,
    pub observed_value: f64,
    pub observed_unit: &'static str,
    pub target_value: f64,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub affected_endpoints: Vec<String>,
}

impl From<&HealthzCheck> for IetfCheck {
    fn from(check: &HealthzCheck) -> Self {
        Self {
            status: check.status.as_ietf(),
            component_id: check.component_id.clone(),
            component_type: check.component_type,
            observed_value: round_ms(check.duration),
            observed_unit: "ms",
            target_value: round_ms(check.target_duration),
            time: check.time.to_rfc3339_opts(SecondsFormat::Millis, true),
            output: check.message.clone(),
            affected_endpoints: vec![check.endpoint.clone()],
        }
    }
}

fn round_ms(duration: Duration) -> f64 {
    (duration.as_secs_f64() * 100_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::probe::result_key;

    fn check(name: &str, ms: u64, failure: Option<&str>) -> HealthzCheck {
        HealthzCheck::classify(
            format!("/api/{}", name),
            Some(name),
            Duration::from_millis(ms),
            Duration::from_millis(100),
            failure.map(str::to_string),
        )
    }

    fn report(checks: Vec<HealthzCheck>) -> HealthReport {
        let map = checks
            .into_iter()
            .map(|c| (result_key(c.component_id.as_deref().unwrap()), c))
            .collect();
        HealthReport::new(map, Duration::from_millis(300), Utc::now())
    }

    #[test]
    fn test_report_status_is_worst_check() {
        assert_eq!(report(vec![]).status, HealthStatus::Healthy);
        assert_eq!(
            report(vec![check("a", 10, None), check("b", 150, None)]).status,
            HealthStatus::Degraded
        );

        let failing = report(vec![check("a", 150, None), check("b", 1, Some("boom"))]);
        assert_eq!(failing.status, HealthStatus::Unhealthy);
        assert_eq!(failing.to_text(), "fail");
    }

    #[test]
    fn test_ietf_document_shape() {
        let report = report(vec![check("getGenres", 150, None), check("searchActors", 20, Some("Not found"))]);
        let service = ServiceInfo::new("datastore-healthz");

        let doc = serde_json::to_value(report.to_ietf(&service)).unwrap();

        assert_eq!(doc["status"], "fail");
        assert_eq!(doc["serviceId"], "datastore-healthz");

        let genres = &doc["checks"]["getGenres:responseTime"][0];
        assert_eq!(genres["status"], "warn");
        assert_eq!(genres["componentType"], "datastore");
        assert_eq!(genres["observedUnit"], "ms");
        assert_eq!(genres["observedValue"], 150.0);
        assert_eq!(genres["targetValue"], 100.0);
        assert_eq!(genres["output"], "Request exceeded expected duration");
        assert_eq!(genres["affectedEndpoints"][0], "/api/getGenres");

        let actors = &doc["checks"]["searchActors:responseTime"][0];
        assert_eq!(actors["status"], "fail");
        assert_eq!(actors["output"], "Not found");
    }

    #[test]
    fn test_ietf_time_is_run_start() {
        let started_at = DateTime::parse_from_rfc3339("2026-10-19T08:30:00.125Z")
            .unwrap()
            .with_timezone(&Utc);
        let report = HealthReport::new(ResultMap::new(), Duration::from_millis(40), started_at);

        let doc = serde_json::to_value(report.to_ietf(&ServiceInfo::new("svc"))).unwrap();
        assert_eq!(doc["time"], "2026-10-19T08:30:00.125Z");
    }

    #[test]
    fn test_healthy_check_omits_output() {
        let doc = serde_json::to_value(IetfCheck::from(&check("getMovieById", 5, None))).unwrap();
        assert!(doc.get("output").is_none());
        assert_eq!(doc["componentId"], "getMovieById");
    }
}

// src/health/checker.rs
use super::probe::{ProbeFailure, ProbeRunner, ResultMap, Stopwatch, RESULT_KEY_SUFFIX};
use super::report::HealthReport;
use super::status::HealthStatus;
use super::HealthzCheck;
use crate::config::ProbeConfig;
use crate::data::DataReader;
use crate::metrics::MetricsCollector;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Runs every datastore probe and aggregates the results into a report.
pub struct DatastoreHealthCheck<R> {
    runner: ProbeRunner<R>,
    probes: ProbeConfig,
    metrics: Option<Arc<MetricsCollector>>,
}

impl<R: DataReader> DatastoreHealthCheck<R> {
    pub fn new(
        reader: Arc<R>,
        probes: ProbeConfig,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let runner = ProbeRunner::new(reader, probes.max_response_time());

        Self {
            runner,
            probes,
            metrics,
        }
    }

    /// Run the probes one after another. A failing probe is logged and does
    /// not stop the remaining ones.
    pub async fn check_health(&self) -> HealthReport {
        let started_at = Utc::now();
        let stopwatch = Stopwatch::start();
        let mut checks = ResultMap::new();
        let probes = &self.probes;

        let outcomes = [
            self.runner.get_genres(Some(&mut checks)).await,
            self.runner
                .get_movie_by_id(&probes.movie_id, Some(&mut checks))
                .await,
            self.runner
                .search_movies(&probes.movie_query, Some(&mut checks))
                .await,
            self.runner
                .get_actor_by_id(&probes.actor_id, Some(&mut checks))
                .await,
            self.runner
                .search_actors(&probes.actor_query, Some(&mut checks))
                .await,
        ];

        let mut failed = 0;
        for outcome in &outcomes {
            if let Err(failure) = outcome {
                failed += 1;
                log_failure(failure);
            }
        }

        if let Some(metrics) = &self.metrics {
            for (key, check) in &checks {
                metrics.record_probe(probe_label(key, check), check);
            }
        }

        let report = HealthReport::new(checks, stopwatch.elapsed(), started_at);

        let degraded = report
            .checks
            .values()
            .filter(|c| c.status == HealthStatus::Degraded)
            .count();
        info!(
            "Health check complete: {} ({} probes, {} degraded, {} failed) in {:?}",
            report.status,
            report.checks.len(),
            degraded,
            failed,
            report.duration
        );

        report
    }
}

fn log_failure(failure: &ProbeFailure) {
    error!(
        endpoint = %failure.check.endpoint,
        component = failure.check.component_id.as_deref().unwrap_or("unknown"),
        duration = ?failure.check.duration,
        "datastore probe failed: {}",
        failure.error
    );
    debug!(error = ?failure.error, "probe failure detail");
}

fn probe_label<'a>(key: &'a str, check: &'a HealthzCheck) -> &'a str {
    check
        .component_id
        .as_deref()
        .unwrap_or_else(|| key.trim_end_matches(RESULT_KEY_SUFFIX))
}

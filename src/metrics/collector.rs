// src/metrics/collector.rs
use crate::health::{HealthStatus, HealthzCheck};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use tracing::error;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!("Failed to encode metrics: {}", e);
        }
        buffer
    }
}

pub struct MetricsCollector {
    // Probe metrics
    pub probe_duration_seconds: HistogramVec,
    pub probe_status: IntGaugeVec,
    pub probe_failures_total: IntCounterVec,

    // Endpoint metrics
    pub health_requests_total: IntCounter,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let probe_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "healthz_probe_duration_seconds",
                "Datastore probe duration in seconds",
            )
            .buckets(vec![0.01, 0.025, 0.05, 0.1, 0.2, 0.4, 0.8, 1.6, 5.0]),
            &["probe"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let probe_status = IntGaugeVec::new(
            Opts::new(
                "healthz_probe_status",
                "Probe status (0=healthy, 1=degraded, 2=unhealthy)",
            ),
            &["probe"],
        )?;
        registry.register(Box::new(probe_status.clone()))?;

        let probe_failures_total = IntCounterVec::new(
            Opts::new("healthz_probe_failures_total", "Total failed probes"),
            &["probe"],
        )?;
        registry.register(Box::new(probe_failures_total.clone()))?;

        let health_requests_total =
            IntCounter::new("healthz_requests_total", "Total health endpoint requests")?;
        registry.register(Box::new(health_requests_total.clone()))?;

        Ok(Self {
            probe_duration_seconds,
            probe_status,
            probe_failures_total,
            health_requests_total,
        })
    }

    pub fn record_probe(&self, probe: &str, check: &HealthzCheck) {
        self.probe_duration_seconds
            .with_label_values(&[probe])
            .observe(check.duration.as_secs_f64());

        let value = match check.status {
            HealthStatus::Healthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 2,
        };
        self.probe_status.with_label_values(&[probe]).set(value);

        if check.status == HealthStatus::Unhealthy {
            self.probe_failures_total.with_label_values(&[probe]).inc();
        }
    }

    pub fn increment_health_requests(&self) {
        self.health_requests_total.inc();
    }
}

// src/health/mod.rs
mod check;
mod checker;
mod probe;
mod report;
mod status;

pub use check::{HealthzCheck, COMPONENT_TYPE, TIMEOUT_MESSAGE};
pub use checker::DatastoreHealthCheck;
pub use probe::{result_key, Probe, RESULT_KEY_SUFFIX, ProbeFailure, ProbeRunner, ResultMap, Stopwatch};
pub use report::{HealthReport, IetfCheck, IetfHealth, ServiceInfo};
pub use status::HealthStatus;

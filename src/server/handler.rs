// src/server/handler.rs
use crate::data::DataReader;
use crate::health::{DatastoreHealthCheck, HealthReport, ServiceInfo};
use crate::metrics::MetricsCollector;
use futures::future::BoxFuture;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;
use tracing::{debug, error};

pub const HEALTHZ_PATH: &str = "/healthz";
pub const HEALTHZ_IETF_PATH: &str = "/healthz/ietf";

const HEALTH_JSON: &str = "application/health+json";
const TEXT_PLAIN: &str = "text/plain";

/// Answers the health endpoints by running the datastore probes per request.
pub struct RequestHandler<R> {
    health: Arc<DatastoreHealthCheck<R>>,
    service: Arc<ServiceInfo>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl<R> Clone for RequestHandler<R> {
    fn clone(&self) -> Self {
        Self {
            health: self.health.clone(),
            service: self.service.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<R: DataReader + 'static> RequestHandler<R> {
    pub fn new(
        health: Arc<DatastoreHealthCheck<R>>,
        service: ServiceInfo,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            health,
            service: Arc::new(service),
            metrics,
        }
    }

    pub async fn handle(&self, req: Request<Body>) -> Response<Body> {
        debug!(method = %req.method(), path = req.uri().path(), "health request");

        if req.method() != Method::GET {
            return respond(StatusCode::METHOD_NOT_ALLOWED, TEXT_PLAIN, "Method Not Allowed");
        }

        let path = req.uri().path().to_string();
        match path.as_str() {
            HEALTHZ_PATH => {
                let report = self.run().await;
                respond(status_code(&report), TEXT_PLAIN, report.to_text())
            }
            HEALTHZ_IETF_PATH => {
                let report = self.run().await;
                match serde_json::to_vec(&report.to_ietf(&self.service)) {
                    Ok(body) => respond(status_code(&report), HEALTH_JSON, body),
                    Err(e) => {
                        error!("Failed to serialize health report: {}", e);
                        respond(StatusCode::INTERNAL_SERVER_ERROR, TEXT_PLAIN, "Internal Server Error")
                    }
                }
            }
            _ => respond(StatusCode::NOT_FOUND, TEXT_PLAIN, "Not Found"),
        }
    }

    async fn run(&self) -> HealthReport {
        if let Some(metrics) = &self.metrics {
            metrics.increment_health_requests();
        }
        self.health.check_health().await
    }
}

impl<R: DataReader + 'static> Service<Request<Body>> for RequestHandler<R> {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(req).await) })
    }
}

/// Degraded still answers 200 so load balancers keep routing traffic.
fn status_code(report: &HealthReport) -> StatusCode {
    if report.status.is_failing() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

pub fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Body>,
) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    response
}

// src/main.rs
use anyhow::Result;
use hyper::{Body, Request, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use datastore_healthz::{
    config,
    data::HttpDataService,
    health::{DatastoreHealthCheck, ServiceInfo},
    metrics::MetricsRegistry,
    server::{respond, RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("datastore_healthz=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    let metrics_registry = MetricsRegistry::new()?;
    let metrics = config.metrics.enabled.then(|| metrics_registry.collector());

    let data_service = Arc::new(HttpDataService::new(&config.data_service)?);
    info!("Probing data service at {}", data_service.base_url());

    let health = Arc::new(DatastoreHealthCheck::new(
        data_service,
        config.probes.clone(),
        metrics.clone(),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    if config.metrics.enabled {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(
            metrics_addr,
            metrics_registry,
            config.metrics.path.clone(),
            shutdown_rx.clone(),
        )
        .await?;
    }

    let handler = RequestHandler::new(
        health,
        ServiceInfo::new(config.server.service_id.clone()),
        metrics,
    );

    let addr: SocketAddr = ([0, 0, 0, 0], config.server.port).into();
    info!("Starting health service on {}", addr);

    let server = ServerBuilder::new(addr).with_handler(handler).bind().await?;

    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    server.serve_with_shutdown(wait_for(shutdown_rx)).await?;

    Ok(())
}

async fn start_metrics_server(
    addr: SocketAddr,
    registry: MetricsRegistry,
    path: String,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    let registry = Arc::new(registry);
    let metrics_path = Arc::new(path);
    let service_path = metrics_path.clone();

    let service = tower::service_fn(move |req: Request<Body>| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            let response = if req.uri().path() == path.as_str() {
                respond(StatusCode::OK, "text/plain; version=0.0.4", registry.gather())
            } else {
                respond(StatusCode::NOT_FOUND, "text/plain", "Not Found")
            };
            Ok::<_, Infallible>(response)
        }
    });

    let server = ServerBuilder::new(addr).with_handler(service).bind().await?;

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.serve_with_shutdown(wait_for(shutdown_rx)).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

async fn wait_for(mut shutdown_rx: watch::Receiver<bool>) {
    while !*shutdown_rx.borrow() {
        if shutdown_rx.changed().await.is_err() {
            return;
        }
    }
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

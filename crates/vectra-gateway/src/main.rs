//! Vectra Gateway
//!
//! HTTP/JSON front for the freight quotation engine:
//! - GET  /health
//! - POST /api/v1/quotations/calculate
//! - GET  /api/v1/integration-logs?limit=N

mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::Method;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use vectra_common::VERSION;
use vectra_pricing::{InMemoryLogStore, IntegrationLogger, PricingConfig, QuotationService, Repositories};

use crate::routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first: it decides the log format
    let config = PricingConfig::load()?;
    init_tracing(config.log.json)?;

    info!("Starting Vectra Gateway v{}", VERSION);
    info!("Loaded configuration: {:?}", config);

    let log_store = Arc::new(InMemoryLogStore::new(config.log.store_capacity));
    let (logger, consumer) = IntegrationLogger::spawn(log_store.clone(), config.logger_config());
    let service = QuotationService::new(&config, Repositories::reference(&config), logger);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let app = routes::router(AppState {
        service: service.clone(),
        log_store,
    })
    .layer(TraceLayer::new_for_http())
    .layer(cors);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Vectra Gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush pending integration log entries
    let metrics = service.logger().shared_metrics();
    drop(service);
    if let Err(e) = consumer.await {
        warn!(error = %e, "Integration log consumer did not stop cleanly");
    }
    let stats = metrics.snapshot();
    info!(
        received = stats.received,
        dropped = stats.dropped,
        persisted = stats.persisted,
        failed = stats.failed,
        "Vectra Gateway stopped"
    );

    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,vectra_gateway=debug,vectra_pricing=debug"))?;

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

//! Deeper Content Server
//!
//! Server-rendered Q&A site with a sanitization pipeline, tag-based
//! caching, and SEO artifacts, backed by Supabase PostgREST.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::info;

use deeper_content::config::ServerConfig;
use deeper_content::handlers::{build_api_routes, build_page_routes, ContentService};
use deeper_content::{metrics, middleware, tracing_setup};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_setup::init_tracing();

    metrics::register_metrics().context("failed to register metrics")?;
    info!("Metrics registered at /metrics");

    info!("Starting Deeper content server...");

    // Load configuration from environment
    let server_config = ServerConfig::from_env();
    server_config.log();

    let service = Arc::new(ContentService::new(server_config.clone())?);

    // Configure rate limiting from config
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(server_config.rate_limit_per_second)
        .burst_size(server_config.rate_limit_burst)
        .finish()
        .context("failed to build rate limiter configuration")?;

    let governor_layer = GovernorLayer::new(governor_conf);

    info!(
        "Rate limiting enabled: {} req/sec, burst of {}",
        server_config.rate_limit_per_second, server_config.rate_limit_burst
    );

    // Build CORS layer from configuration
    let cors = server_config.cors.to_layer();

    // Management API routes get rate limiting; pages, health, and metrics
    // must always be reachable for visitors and Kubernetes probes.
    let api_routes = build_api_routes(service.clone()).layer(governor_layer);
    let page_routes = build_page_routes(service);

    let max_concurrent = server_config.max_concurrent_requests;
    info!("Concurrency limiting enabled: max_concurrent={max_concurrent}");

    let app = axum::Router::new()
        .merge(page_routes)
        .merge(api_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(cors);

    // Start server using host/port from config
    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .context("invalid host/port configuration")?;
    info!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

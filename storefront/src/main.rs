//! Raffle storefront HTTP server.
//!
//! Serves the storefront API with the in-memory ticket store and the mock
//! payment gateway. Swapping either for a production backend is a wiring
//! change here, not a code change anywhere else.

use rifa_core::environment::{SystemClock, ThreadRngSource};
use rifa_storefront::{
    Config, InMemoryTicketStore, MockPaymentGateway,
    metrics::register_business_metrics,
    server::{AppState, build_router},
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present, then initialize tracing
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rifa_storefront=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Raffle Storefront HTTP Server");

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Configuration loaded"
    );

    // Register business metrics descriptions
    register_business_metrics();

    // Wire collaborators
    let state = AppState::new(
        InMemoryTicketStore::shared(),
        MockPaymentGateway::shared(),
        Arc::new(SystemClock),
        Arc::new(ThreadRngSource),
        Arc::clone(&config),
    );

    // Build router
    let app = build_router(state);

    // Create server address
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on {addr}");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM. If a handler cannot be
/// installed the branch stays pending so the other can still fire.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

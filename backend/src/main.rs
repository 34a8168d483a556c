use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use tracing::info;

use librarian_backend::config::ServerConfig;
use librarian_backend::domain::SystemClock;
use librarian_backend::logging::init_logger;
use librarian_backend::storage::DbConnection;
use librarian_backend::{create_router, initialize_backend, spawn_penalty_sweeper};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logger(config.verbose, config.log_json);
    config.validate()?;

    info!("Setting up database");
    let db = DbConnection::new(&config.database_url, &config.pool_settings()).await?;

    let app_state = initialize_backend(db, config.lending_policy(), Arc::new(SystemClock));

    let sweeper = config
        .penalty_sweep_interval()
        .map(|period| spawn_penalty_sweeper(app_state.member_service.clone(), period));

    let cors_origin = config
        .cors_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .context("Invalid CORS origin")?;

    let app = create_router(app_state, cors_origin);

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

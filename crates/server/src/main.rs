mod audit;
mod backend;
mod bootstrap;
mod errors;
mod health;
mod purchase;
mod register;

use std::time::Duration;

use agribazaar_core::config::{AppConfig, LoadOptions};
use anyhow::Result;
use tracing::{info, warn};

fn init_logging(config: &AppConfig) {
    use agribazaar_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let address = app.config.listen_address();
    let grace_period = Duration::from_secs(app.config.server.graceful_shutdown_secs);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "agribazaar-server listening"
    );

    let router = app.router();
    let server =
        async move { axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await };
    tokio::select! {
        result = server => result?,
        _ = shutdown_deadline(grace_period) => {
            warn!(
                event_name = "system.server.forced_shutdown",
                correlation_id = "shutdown",
                grace_period_secs = grace_period.as_secs(),
                "in-flight requests did not drain before the grace period elapsed"
            );
        }
    }

    info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "agribazaar-server stopped"
    );
    Ok(())
}

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(
            event_name = "system.server.signal_unavailable",
            correlation_id = "shutdown",
            error = %error,
            "could not install the shutdown signal handler"
        );
        std::future::pending::<()>().await;
    }
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "shutdown signal received, draining connections"
    );
}

async fn shutdown_deadline(grace_period: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace_period).await;
}

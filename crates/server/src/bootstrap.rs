use std::sync::Arc;

use agribazaar_core::audit::AuditSink;
use agribazaar_core::config::{AppConfig, ConfigError, LoadOptions};
use axum::Router;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::audit::TracingAuditSink;
use crate::backend::{HttpUserBackend, UserBackend};
use crate::{health, purchase, register};

pub struct Application {
    pub config: AppConfig,
    pub user_backend: Arc<dyn UserBackend>,
    pub audit_sink: Arc<dyn AuditSink>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("user service client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let user_backend = HttpUserBackend::new(&config.backend).map_err(BootstrapError::HttpClient)?;
    info!(
        event_name = "system.bootstrap.backend_configured",
        correlation_id = "bootstrap",
        user_endpoint = %user_backend.endpoint(),
        timeout_secs = config.backend.timeout_secs,
        "user service client configured"
    );

    Ok(Application {
        config,
        user_backend: Arc::new(user_backend),
        audit_sink: Arc::new(TracingAuditSink),
    })
}

impl Application {
    pub fn router(&self) -> Router {
        Router::new()
            .merge(health::router(self.config.backend.user_endpoint.clone()))
            .merge(register::router(self.user_backend.clone(), self.audit_sink.clone()))
            .merge(purchase::router(
                self.config.payment.destination.clone(),
                self.audit_sink.clone(),
            ))
            .layer(TraceLayer::new_for_http())
    }
}

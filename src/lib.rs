#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod migration;
pub mod services;
pub mod telemetry;

use crate::adapters::database::{PgSchemaStore, init_pool};
use crate::api::AppState;
use crate::config::Config;
use crate::services::health_service::HealthService;
use crate::services::schema_store::SchemaStore;
use std::sync::Arc;
use tokio::sync::watch;

/// Wires the storage backend into the services behind the router.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    store: Option<Arc<dyn SchemaStore>>,
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, store: None }
    }

    /// Uses `store` instead of a Postgres pool built from the configuration.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn SchemaStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// # Errors
    /// Returns `AppError` if the database URL is invalid or the expected table list is rejected.
    pub fn build(self) -> error::Result<AppState> {
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(PgSchemaStore::new(init_pool(&self.config.database)?)),
        };
        let health_service = HealthService::new(store, &self.config.health)?;
        tracing::info!(tables = health_service.tables().len(), "Schema probe configured");
        Ok(AppState { health_service })
    }
}

/// Routes panics through `tracing` so they reach the configured log output.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(ToString::to_string).unwrap_or_default();
        tracing::error!(panic = %info, location = %location, "panic occurred");
    }));
}

/// Flips `shutdown_tx` to `true` on SIGINT or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to install SIGTERM handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

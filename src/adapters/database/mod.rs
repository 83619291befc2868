pub mod schema_repo;

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Pool, Postgres};
use std::time::Duration;

pub use schema_repo::PgSchemaStore;

pub type DbPool = Pool<Postgres>;

/// Builds connection options from the URL, using the service key as password when present.
///
/// # Errors
/// Returns `sqlx::Error::Configuration` if the URL cannot be parsed.
pub fn connect_options(url: &str, service_key: Option<&str>) -> Result<PgConnectOptions, sqlx::Error> {
    let options: PgConnectOptions = url.parse()?;
    Ok(match service_key {
        Some(key) => options.password(key),
        None => options,
    })
}

/// Initializes the database connection pool.
///
/// Connections are opened on first use, so an unreachable database is
/// reported by the health probes rather than failing startup.
///
/// # Errors
/// Returns `sqlx::Error` if the connection options are invalid.
pub fn init_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = connect_options(&config.url, config.service_key.as_deref())?;
    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_lazy_with(options))
}

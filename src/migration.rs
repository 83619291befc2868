//! One-shot migration runner.
//!
//! Reads database credentials from a local env file, loads a SQL file and hands
//! it to the `exec_sql` database function in a single call.

use crate::adapters::database::connect_options;
use clap::Parser;
use sqlx::{Connection, PgConnection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const URL_VAR: &str = "KBASE_DATABASE_URL";
pub const SERVICE_KEY_VAR: &str = "KBASE_DATABASE_SERVICE_KEY";

#[derive(Clone, Debug, Parser)]
#[command(name = "kbase-migrate", version, about = "Apply the knowledge base SQL migration", long_about = None)]
pub struct MigrateConfig {
    /// File holding KEY=VALUE credential lines
    #[arg(long, default_value = ".env.local")]
    pub env_file: PathBuf,

    /// SQL file to submit
    #[arg(long, default_value = "supabase/migrations/20251020_initial_schema.sql")]
    pub migration: PathBuf,

    /// SQL editor URL shown in the manual fallback instructions
    #[arg(long, env = "KBASE_DASHBOARD_URL")]
    pub dashboard_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("could not read env file {}: {source}", .path.display())]
    EnvFile { path: PathBuf, source: std::io::Error },
    #[error("missing KBASE_DATABASE_URL or KBASE_DATABASE_SERVICE_KEY in env file")]
    MissingCredentials,
    #[error("could not read migration {}: {source}", .path.display())]
    MigrationFile { path: PathBuf, source: std::io::Error },
    #[error("could not connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("exec_sql call failed: {0}")]
    Rpc(#[source] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub url: String,
    pub service_key: String,
}

impl Credentials {
    /// # Errors
    /// Returns `MigrationError::MissingCredentials` if either variable is absent or empty.
    pub fn from_env_vars(vars: &HashMap<String, String>) -> Result<Self, MigrationError> {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();
        match (get(URL_VAR), get(SERVICE_KEY_VAR)) {
            (Some(url), Some(service_key)) => Ok(Self { url, service_key }),
            _ => Err(MigrationError::MissingCredentials),
        }
    }
}

/// Parses `KEY=VALUE` lines. Blank lines, comments and lines without `=` are skipped.
#[must_use]
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// # Errors
/// Returns `MigrationError::EnvFile` or `MigrationError::MissingCredentials`.
pub async fn load_credentials(path: &Path) -> Result<Credentials, MigrationError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| MigrationError::EnvFile { path: path.to_path_buf(), source })?;
    Credentials::from_env_vars(&parse_env_file(&contents))
}

/// Loads credentials and the SQL file, then submits the SQL through `exec_sql`.
///
/// # Errors
/// Returns the first failure encountered; nothing is retried.
pub async fn run(config: &MigrateConfig) -> Result<(), MigrationError> {
    let credentials = load_credentials(&config.env_file).await?;

    tracing::info!(path = %config.migration.display(), "Reading migration file");
    let sql = tokio::fs::read_to_string(&config.migration)
        .await
        .map_err(|source| MigrationError::MigrationFile { path: config.migration.clone(), source })?;

    let options =
        connect_options(&credentials.url, Some(&credentials.service_key)).map_err(MigrationError::Connect)?;
    let mut conn = PgConnection::connect_with(&options).await.map_err(MigrationError::Connect)?;

    tracing::info!(bytes = sql.len(), "Running migration");
    let outcome = sqlx::query("SELECT exec_sql(sql_query => $1)").bind(&sql).execute(&mut conn).await;
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "Failed to close migration connection cleanly");
    }
    outcome.map_err(MigrationError::Rpc)?;

    Ok(())
}

/// Steps for applying the migration by hand when `run` fails.
#[must_use]
pub fn manual_instructions(config: &MigrateConfig) -> String {
    let editor = config.dashboard_url.as_deref().unwrap_or("your database dashboard's SQL editor");
    format!(
        "Please run the migration manually:\n\n1. Go to: {editor}\n2. Copy the contents of: {}\n3. Paste and click \"Run\"\n",
        config.migration.display()
    )
}

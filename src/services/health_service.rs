use crate::config::HealthConfig;
use crate::domain::schema::{AggregateStatus, ProbeResult, ResourceName, ResourceNames, summarize};
use crate::error::{ConfigError, StoreError};
use crate::services::schema_store::{SchemaSession, SchemaStore};
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, timeout_at};

#[derive(Clone, Debug)]
pub struct Metrics {
    pub status: Gauge<i64>,
    pub table_present: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("kbase-server");
        Self {
            status: meter
                .i64_gauge("kbase_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
            table_present: meter
                .i64_gauge("kbase_schema_table_present")
                .with_description("Whether an expected table was readable on the last schema probe")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No session could be opened.
    Connection,
    /// The probe deadline expired.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection => f.write_str("connection"),
            Self::Timeout => f.write_str("timeout"),
        }
    }
}

/// The schema probe could not run to completion.
#[derive(Debug, Clone, Error)]
#[error("{kind} failure: {message}")]
pub struct ProbeFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Results gathered before the failure, if the per-table loop had started.
    pub partial: Option<ProbeResult>,
}

#[derive(Debug, Clone)]
pub struct SchemaReport {
    pub status: AggregateStatus,
    pub message: String,
    pub details: ProbeResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionReport {
    pub rows: usize,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionFailure {
    /// The database could not be reached at all.
    #[error("{0}")]
    Unavailable(String),
    /// The database answered but the probe table could not be read.
    #[error("{0}")]
    Query(String),
}

#[derive(Clone, Debug)]
pub struct HealthService {
    store: Arc<dyn SchemaStore>,
    tables: ResourceNames,
    connection_table: ResourceName,
    timeout: Duration,
    metrics: Metrics,
}

impl HealthService {
    /// # Errors
    /// Returns `ConfigError` if a table name is repeated or the connection probe table is blank.
    pub fn new(store: Arc<dyn SchemaStore>, config: &HealthConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            store,
            tables: ResourceNames::new(config.table_names())?,
            connection_table: ResourceName::new(config.connection_probe_table.clone())?,
            timeout: Duration::from_millis(config.timeout_ms),
            metrics: Metrics::new(),
        })
    }

    #[must_use]
    pub const fn tables(&self) -> &ResourceNames {
        &self.tables
    }

    /// Probes every expected table and classifies the outcome.
    ///
    /// # Errors
    /// Returns `ProbeFailure` if no session can be opened or the deadline expires.
    /// Missing tables are not errors; they are reported as `false` in the details.
    pub async fn check_schema(&self) -> Result<SchemaReport, ProbeFailure> {
        let deadline = Instant::now() + self.timeout;

        let mut session = match timeout_at(deadline, self.store.open_session()).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "schema")]);
                return Err(ProbeFailure { kind: FailureKind::Connection, message: e.message, partial: None });
            }
            Err(_) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "schema")]);
                return Err(ProbeFailure {
                    kind: FailureKind::Timeout,
                    message: "Database connection timed out".to_string(),
                    partial: None,
                });
            }
        };

        let details = match check_resources(session.as_mut(), &self.tables, deadline).await {
            Ok(details) => details,
            Err(partial) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "schema")]);
                tracing::warn!(checked = partial.len(), expected = self.tables.len(), "Schema probe timed out");
                return Err(ProbeFailure {
                    kind: FailureKind::Timeout,
                    message: format!(
                        "Schema probe timed out after checking {} of {} tables",
                        partial.len(),
                        self.tables.len()
                    ),
                    partial: Some(partial),
                });
            }
        };

        for (name, present) in details.iter() {
            self.metrics.table_present.record(i64::from(present), &[KeyValue::new("table", name.to_string())]);
        }

        let status = summarize(&details);
        self.metrics
            .status
            .record(i64::from(status == AggregateStatus::AllPresent), &[KeyValue::new("component", "schema")]);

        let message = match status {
            AggregateStatus::AllPresent => "All tables created successfully!".to_string(),
            _ => "Some tables missing".to_string(),
        };

        Ok(SchemaReport { status, message, details })
    }

    /// Samples a row from the connection probe table.
    ///
    /// # Errors
    /// Returns `ConnectionFailure::Unavailable` if no session can be opened in time,
    /// or `ConnectionFailure::Query` if the table cannot be read.
    pub async fn check_connection(&self) -> Result<ConnectionReport, ConnectionFailure> {
        let deadline = Instant::now() + self.timeout;

        let result = timeout_at(deadline, async {
            let mut session = self.store.open_session().await.map_err(|e| ConnectionFailure::Unavailable(e.message))?;
            session.sample(&self.connection_table, 1).await.map_err(|e| ConnectionFailure::Query(e.message))
        })
        .await
        .unwrap_or_else(|_| Err(ConnectionFailure::Unavailable("Database connection timed out".to_string())));

        match result {
            Ok(rows) => {
                self.metrics.status.record(1, &[KeyValue::new("component", "database")]);
                Ok(ConnectionReport { rows })
            }
            Err(e) => {
                self.metrics.status.record(0, &[KeyValue::new("component", "database")]);
                Err(e)
            }
        }
    }
}

/// Runs a zero-row read against every table, in order, on one session.
///
/// A failed read is recorded as `false` and the loop moves on. If the deadline
/// passes, the results gathered so far are returned as the error value and
/// unchecked tables are left out.
pub async fn check_resources(
    session: &mut dyn SchemaSession,
    names: &ResourceNames,
    deadline: Instant,
) -> Result<ProbeResult, ProbeResult> {
    let mut result = ProbeResult::new();
    for name in names.iter() {
        match timeout_at(deadline, session.probe(name)).await {
            Ok(outcome) => {
                if let Err(StoreError { message }) = &outcome {
                    tracing::debug!(table = %name, error = %message, "Table probe failed");
                }
                result.record(name.clone(), outcome.is_ok());
            }
            Err(_) => return Err(result),
        }
    }
    Ok(result)
}

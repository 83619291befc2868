use crate::domain::schema::{AggregateStatus, ProbeResult};
use crate::services::health_service::{ConnectionFailure, ConnectionReport, FailureKind, ProbeFailure, SchemaReport};
use serde::Serialize;

pub const MIGRATION_HINT: &str = "Make sure you have run the database migration (kbase-migrate or the SQL editor)";
pub const CREDENTIALS_HINT: &str = "Check that KBASE_DATABASE_URL and KBASE_DATABASE_SERVICE_KEY are set correctly";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts_count: Option<usize>,
}

impl From<ConnectionReport> for ConnectionResponse {
    fn from(report: ConnectionReport) -> Self {
        Self {
            status: "success",
            message: "Database connection working!".to_string(),
            hint: None,
            facts_count: Some(report.rows),
        }
    }
}

impl From<ConnectionFailure> for ConnectionResponse {
    fn from(failure: ConnectionFailure) -> Self {
        let hint = match failure {
            ConnectionFailure::Unavailable(_) => CREDENTIALS_HINT,
            ConnectionFailure::Query(_) => MIGRATION_HINT,
        };
        Self { status: "error", message: failure.to_string(), hint: Some(hint), facts_count: None }
    }
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
    pub tables: Option<ProbeResult>,
}

/// `all-present` is reported as `success` on the wire.
const fn wire_status(status: AggregateStatus) -> &'static str {
    match status {
        AggregateStatus::AllPresent => "success",
        AggregateStatus::Partial => "partial",
        AggregateStatus::Error => "error",
    }
}

impl From<SchemaReport> for SchemaResponse {
    fn from(report: SchemaReport) -> Self {
        Self { status: wire_status(report.status), message: report.message, hint: None, tables: Some(report.details) }
    }
}

impl From<ProbeFailure> for SchemaResponse {
    fn from(failure: ProbeFailure) -> Self {
        let hint = match failure.kind {
            FailureKind::Connection | FailureKind::Timeout => CREDENTIALS_HINT,
        };
        Self {
            status: wire_status(AggregateStatus::Error),
            message: failure.message,
            hint: Some(hint),
            tables: failure.partial,
        }
    }
}

use crate::api::AppState;
use crate::api::schemas::health::{ConnectionResponse, SchemaResponse};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

/// Liveness probe: returns 200 OK as long as the server is running.
pub async fn livez() -> impl IntoResponse {
    StatusCode::OK
}

/// Reads a row from the connection probe table.
pub async fn connection(State(state): State<AppState>) -> impl IntoResponse {
    match state.health_service.check_connection().await {
        Ok(report) => (StatusCode::OK, Json(ConnectionResponse::from(report))),
        Err(e) => {
            tracing::warn!(error = %e, component = "database", "Connection probe failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ConnectionResponse::from(e)))
        }
    }
}

/// Checks that every expected table can be read. Missing tables still answer 200.
pub async fn schema(State(state): State<AppState>) -> impl IntoResponse {
    match state.health_service.check_schema().await {
        Ok(report) => {
            if let Some(missing) = report.details.missing().next() {
                tracing::info!(status = %report.status, first_missing = %missing, "Schema probe found missing tables");
            }
            (StatusCode::OK, Json(SchemaResponse::from(report)))
        }
        Err(e) => {
            tracing::warn!(error = %e, component = "schema", "Schema probe failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(SchemaResponse::from(e)))
        }
    }
}

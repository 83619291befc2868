use axum::response::{Html, IntoResponse};

/// Serves the static landing page.
pub async fn index() -> impl IntoResponse {
    Html(include_str!("../../static/index.html"))
}

//! Dashboard page.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Serves the page that polls `/api/events`.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

//! Root greeting endpoint.

use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Body of the root route.
pub const GREETING: &str = "Hello and Welcome!";

/// `/` — Static greeting.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Greeting",
    description = "Returns a static greeting. Never fails.",
    responses(
        (status = 200, description = "Greeting", body = String, content_type = "text/plain"),
    )
)]
pub async fn index_handler() -> impl IntoResponse {
    (StatusCode::OK, GREETING)
}

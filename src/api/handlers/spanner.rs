//! Spanner database listing endpoint.

use axum::extract::State;
use axum::response::IntoResponse;

use crate::app_state::AppState;
use crate::service::ResponseSink;
use crate::service::passthrough;

/// `/spannergrpc` — List the databases of the configured instance.
#[utoipa::path(
    get,
    path = "/spannergrpc",
    tag = "Spanner",
    summary = "List databases over gRPC",
    description = "Pages through ListDatabases for the configured Spanner instance and writes \
                   one database name per line, followed by a success trailer.",
    responses(
        (status = 200, description = "Database names", body = String, content_type = "text/plain"),
        (status = 500, description = "Listing failed part-way", body = String, content_type = "text/plain"),
    )
)]
pub async fn spanner_grpc_handler(State(state): State<AppState>) -> impl IntoResponse {
    let sink = ResponseSink::new();
    passthrough::list_databases(
        state.clients.database_admin.as_ref(),
        &state.targets.spanner_instance,
        &sink,
    )
    .await;
    sink
}

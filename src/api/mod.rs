//! HTTP layer: route handlers, OpenAPI description and router composition.

pub mod handlers;

use std::future::Future;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the gateway routes.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "cloud-fanout-gateway"),
    paths(
        handlers::system::index_handler,
        handlers::spanner::spanner_grpc_handler,
        handlers::bigquery::bigquery_http_handler,
        handlers::translate::translate_grpc_handler,
        handlers::translate::translate_http_handler,
    ),
    tags(
        (name = "System", description = "Greeting"),
        (name = "Spanner", description = "Database administration over gRPC"),
        (name = "BigQuery", description = "Queries over REST"),
        (name = "Translation", description = "Concurrent translation over gRPC and REST"),
    )
)]
pub struct ApiDoc;

/// Builds the router with all gateway routes. Unmatched paths get 404.
pub fn build_router() -> Router<AppState> {
    handlers::routes()
}

/// Builds the complete application with request tracing and state.
pub fn app(state: AppState) -> Router {
    build_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the application on `listener` until `shutdown` resolves.
///
/// The clients in `state` are released once serving stops, whether it ended
/// cleanly or with an error.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let clients = state.clients.clone();
    let served = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await;
    clients.close();
    served
}

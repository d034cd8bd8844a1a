//! Endpoint handlers, one module per upstream service.

pub mod bigquery;
pub mod spanner;
pub mod system;
pub mod translate;

use axum::Router;
use axum::routing::any;

use crate::app_state::AppState;

/// The five gateway routes. Every method is accepted on each path.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", any(system::index_handler))
        .route("/spannergrpc", any(spanner::spanner_grpc_handler))
        .route("/bigqueryhttp", any(bigquery::bigquery_http_handler))
        .route("/translategrpc", any(translate::translate_grpc_handler))
        .route("/translatehttp", any(translate::translate_http_handler))
}

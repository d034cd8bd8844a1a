//! BigQuery query endpoint.

use axum::extract::State;
use axum::response::IntoResponse;

use crate::app_state::AppState;
use crate::clients::QueryRequest;
use crate::service::ResponseSink;
use crate::service::inputs::TOP_TERMS_QUERY;
use crate::service::passthrough;

/// `/bigqueryhttp` — Run the top search terms query.
#[utoipa::path(
    get,
    path = "/bigqueryhttp",
    tag = "BigQuery",
    summary = "Run a query over REST",
    description = "Runs the daily top Google Search terms query and writes one row per line.",
    responses(
        (status = 200, description = "Result rows", body = String, content_type = "text/plain"),
        (status = 500, description = "Run, wait, job status or row read failed", body = String, content_type = "text/plain"),
    )
)]
pub async fn bigquery_http_handler(State(state): State<AppState>) -> impl IntoResponse {
    let sink = ResponseSink::new();
    let request = QueryRequest {
        sql: TOP_TERMS_QUERY.to_string(),
        location: state.targets.bigquery_location.clone(),
    };
    // The failing stage has already written its error into the sink.
    if let Err(stage) =
        passthrough::run_query(state.clients.analytics.as_ref(), &request, &sink).await
    {
        tracing::debug!(?stage, "query route answered with error");
    }
    sink
}

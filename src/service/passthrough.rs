//! Single-call routes: Spanner database listing and the BigQuery query.
//!
//! Both write their results line by line into a [`ResponseSink`]. The first
//! error sets status 500, appends the error text and ends processing; output
//! already written is left in place.

use axum::http::StatusCode;

use super::ResponseSink;
use crate::clients::bigquery::format_row;
use crate::clients::{Analytics, DatabaseAdmin, Paginator, QueryRequest};

/// Trailer written after a complete database listing.
pub const LISTING_SUCCESS: &str = "listing database was successful!";

/// Lists the databases under `parent`, one name per line.
///
/// Returns the number of databases written.
pub async fn list_databases(admin: &dyn DatabaseAdmin, parent: &str, sink: &ResponseSink) -> usize {
    sink.write_line(&format!("Databases for instance/[{parent}]"));

    let mut databases = Paginator::new(|token| admin.list_databases_page(parent, token));
    let mut count = 0;
    loop {
        match databases.next().await {
            Ok(Some(database)) => {
                sink.write_line(&database.name);
                count += 1;
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(parent, error = %e, "listing databases failed");
                sink.fail(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &format!("error iterating through response: {e}"),
                );
                return count;
            }
        }
    }

    sink.write(LISTING_SUCCESS);
    tracing::info!(parent, count, "listed databases");
    count
}

/// Stage of the query flow that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    /// Submitting the job.
    Run,
    /// Waiting for the job to finish.
    Wait,
    /// The finished job reported an error.
    Status,
    /// Reading result rows.
    Read,
}

impl QueryStage {
    fn message_prefix(self) -> &'static str {
        match self {
            Self::Run => "can not run query",
            Self::Wait => "error waiting on job to finish",
            Self::Status => "error in job status",
            Self::Read => "error iterating results",
        }
    }
}

/// Runs `request` to completion and writes each row on its own line.
///
/// Returns the number of rows written, or the stage that failed.
///
/// # Errors
///
/// Returns the failing [`QueryStage`]; its error text is already in `sink`.
pub async fn run_query(
    analytics: &dyn Analytics,
    request: &QueryRequest,
    sink: &ResponseSink,
) -> Result<usize, QueryStage> {
    let fail = |stage: QueryStage, e: &dyn std::fmt::Display| {
        tracing::warn!(?stage, error = %e, "query failed");
        sink.fail(
            StatusCode::INTERNAL_SERVER_ERROR,
            &format!("{}: {e}", stage.message_prefix()),
        );
        stage
    };

    let job = analytics
        .run_query(request)
        .await
        .map_err(|e| fail(QueryStage::Run, &e))?;
    let status = analytics
        .wait_for_job(&job)
        .await
        .map_err(|e| fail(QueryStage::Wait, &e))?;
    status.err().map_err(|e| fail(QueryStage::Status, &e))?;

    let mut rows = Paginator::new(|token| analytics.read_rows_page(&job, token));
    let mut count = 0;
    while let Some(row) = rows.next().await.map_err(|e| fail(QueryStage::Read, &e))? {
        sink.write_line(&format_row(&row));
        count += 1;
    }

    tracing::info!(job_id = %job.job_id, rows = count, "query is done!");
    Ok(count)
}

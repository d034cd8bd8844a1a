//! Clients for the Google Cloud services behind each route.
//!
//! Each service sits behind a small async trait so handlers can be driven
//! by the real gRPC/REST clients in production and by fakes in tests:
//!
//! ```text
//! DatabaseAdmin   ── SpannerAdminClient     (gRPC)
//! Analytics       ── BigQueryClient         (REST)
//! TextTranslator  ── TranslateGrpcClient    (gRPC, pooled channels)
//!                 └─ TranslateRestClient    (REST)
//! ```

pub mod bigquery;
pub mod grpc;
pub mod pager;
pub mod proto;
pub mod registry;
pub mod rest;
pub mod spanner_admin;
pub mod translate_grpc;
pub mod translate_rest;

use std::fmt;

use async_trait::async_trait;

use crate::error::GatewayError;

pub use bigquery::BigQueryClient;
pub use pager::{Page, Paginator};
pub use registry::ClientRegistry;
pub use spanner_admin::SpannerAdminClient;
pub use translate_grpc::TranslateGrpcClient;
pub use translate_rest::TranslateRestClient;

/// Summary of a Spanner database returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    /// Fully-qualified name, `projects/<p>/instances/<i>/databases/<d>`.
    pub name: String,
}

/// Spanner database administration.
#[async_trait]
pub trait DatabaseAdmin: Send + Sync + fmt::Debug {
    /// Fetches one page of the databases under `parent`.
    ///
    /// `page_token` is `None` for the first page.
    async fn list_databases_page(
        &self,
        parent: &str,
        page_token: Option<String>,
    ) -> Result<Page<DatabaseInfo>, GatewayError>;
}

/// A query to run as a BigQuery job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// Standard SQL text.
    pub sql: String,
    /// Location the job runs in; must match the referenced datasets.
    pub location: String,
}

/// Identifies a submitted query job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReference {
    /// Project that owns the job.
    pub project_id: String,
    /// Job identifier.
    pub job_id: String,
    /// Location the job runs in.
    pub location: String,
}

/// Final state of a query job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    /// Job state, `DONE` once finished.
    pub state: String,
    /// Error result when the job failed.
    pub error: Option<JobError>,
}

/// Error result attached to a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobError {
    /// Short error code, e.g. `invalidQuery`.
    pub reason: String,
    /// Human-readable description.
    pub message: String,
}

impl JobStatus {
    /// Returns the job's failure as an error, if it failed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::JobFailed`] when the job carries an error
    /// result.
    pub fn err(&self) -> Result<(), GatewayError> {
        match &self.error {
            Some(error) => Err(GatewayError::JobFailed {
                reason: error.reason.clone(),
                message: error.message.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// One result row; cells keep BigQuery's JSON representation.
pub type Row = Vec<serde_json::Value>;

/// BigQuery query execution.
#[async_trait]
pub trait Analytics: Send + Sync + fmt::Debug {
    /// Submits `request` as a query job.
    async fn run_query(&self, request: &QueryRequest) -> Result<JobReference, GatewayError>;

    /// Blocks until the job is no longer running.
    async fn wait_for_job(&self, job: &JobReference) -> Result<JobStatus, GatewayError>;

    /// Reads one page of the finished job's rows.
    async fn read_rows_page(
        &self,
        job: &JobReference,
        page_token: Option<String>,
    ) -> Result<Page<Row>, GatewayError>;
}

/// Wire transport a translator uses, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// gRPC over HTTP/2.
    Grpc,
    /// JSON over HTTP.
    Rest,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grpc => f.write_str("grpc"),
            Self::Rest => f.write_str("rest"),
        }
    }
}

/// A `TranslateText` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    /// `projects/<p>/locations/<l>`.
    pub parent: String,
    /// BCP-47 code of the requested output language.
    pub target_language_code: String,
    /// Texts to translate.
    pub contents: Vec<String>,
}

/// One translated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// The translated text.
    pub translated_text: String,
    /// Source language detected by the service, when not supplied.
    pub detected_language_code: Option<String>,
}

/// Cloud Translation.
#[async_trait]
pub trait TextTranslator: Send + Sync + fmt::Debug {
    /// Translates every entry of `request.contents`.
    async fn translate_text(
        &self,
        request: TranslateRequest,
    ) -> Result<Vec<Translation>, GatewayError>;

    /// Transport this client speaks.
    fn transport(&self) -> Transport;
}

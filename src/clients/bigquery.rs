//! BigQuery query jobs over the v2 REST API.
//!
//! A query runs in three round trips: `jobs.insert` submits it with a
//! client-generated job id, `jobs.get` is polled until the job is `DONE`,
//! and `jobs.getQueryResults` pages through the rows.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Analytics, JobError, JobReference, JobStatus, Page, QueryRequest, Row, rest};
use crate::auth::TokenSource;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

const FIRST_POLL_INTERVAL: Duration = Duration::from_millis(250);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(4);

/// REST client for BigQuery query jobs in one project.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    tokens: TokenSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertJobBody<'a> {
    job_reference: JobReferenceJson,
    configuration: JobConfiguration<'a>,
}

#[derive(Debug, Serialize)]
struct JobConfiguration<'a> {
    query: QueryConfiguration<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryConfiguration<'a> {
    query: &'a str,
    use_legacy_sql: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReferenceJson {
    project_id: String,
    job_id: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobJson {
    job_reference: JobReferenceJson,
    #[serde(default)]
    status: Option<JobStatusJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusJson {
    #[serde(default)]
    state: String,
    #[serde(default)]
    error_result: Option<ErrorProtoJson>,
}

#[derive(Debug, Deserialize)]
struct ErrorProtoJson {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResultsJson {
    #[serde(default)]
    job_complete: bool,
    #[serde(default)]
    rows: Vec<RowJson>,
    #[serde(default)]
    page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RowJson {
    #[serde(default)]
    f: Vec<CellJson>,
}

#[derive(Debug, Deserialize)]
struct CellJson {
    #[serde(default)]
    v: serde_json::Value,
}

impl BigQueryClient {
    /// Creates a client for `config.project_id` against
    /// `config.bigquery_endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the HTTP client cannot be built.
    pub fn connect(config: &GatewayConfig, tokens: TokenSource) -> Result<Self, GatewayError> {
        Ok(Self {
            client: rest::http_client(config.http_timeout)?,
            base_url: rest::base_url(&config.bigquery_endpoint),
            project_id: config.project_id.clone(),
            tokens,
        })
    }

    fn job_url(&self, job: &JobReference) -> String {
        format!(
            "{}/projects/{}/jobs/{}",
            self.base_url, job.project_id, job.job_id
        )
    }

    async fn fetch_status(&self, job: &JobReference) -> Result<JobStatusJson, GatewayError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.job_url(job))
            .bearer_auth(token)
            .query(&[("location", job.location.as_str())])
            .send()
            .await?;
        let job_json: JobJson = rest::decode_json(response).await?;
        job_json
            .status
            .ok_or_else(|| GatewayError::InvalidResponse("job has no status".to_string()))
    }
}

#[async_trait]
impl Analytics for BigQueryClient {
    async fn run_query(&self, request: &QueryRequest) -> Result<JobReference, GatewayError> {
        let token = self.tokens.access_token().await?;
        let job_id = format!("job_{}", uuid::Uuid::new_v4().simple());
        let body = InsertJobBody {
            job_reference: JobReferenceJson {
                project_id: self.project_id.clone(),
                job_id,
                location: Some(request.location.clone()),
            },
            configuration: JobConfiguration {
                query: QueryConfiguration {
                    query: &request.sql,
                    use_legacy_sql: false,
                },
            },
        };
        let response = self
            .client
            .post(format!("{}/projects/{}/jobs", self.base_url, self.project_id))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let job: JobJson = rest::decode_json(response).await?;

        let reference = JobReference {
            project_id: job.job_reference.project_id,
            job_id: job.job_reference.job_id,
            location: job
                .job_reference
                .location
                .unwrap_or_else(|| request.location.clone()),
        };
        tracing::info!(job_id = %reference.job_id, location = %reference.location, "query job submitted");
        Ok(reference)
    }

    async fn wait_for_job(&self, job: &JobReference) -> Result<JobStatus, GatewayError> {
        let mut interval = FIRST_POLL_INTERVAL;
        loop {
            let status = self.fetch_status(job).await?;
            if status.state == "DONE" {
                return Ok(JobStatus {
                    state: status.state,
                    error: status.error_result.map(|e| JobError {
                        reason: e.reason,
                        message: e.message,
                    }),
                });
            }
            tracing::debug!(job_id = %job.job_id, state = %status.state, "query job still running");
            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(MAX_POLL_INTERVAL);
        }
    }

    async fn read_rows_page(
        &self,
        job: &JobReference,
        page_token: Option<String>,
    ) -> Result<Page<Row>, GatewayError> {
        let token = self.tokens.access_token().await?;
        let mut query = vec![("location", job.location.clone())];
        if let Some(page_token) = page_token {
            query.push(("pageToken", page_token));
        }
        let response = self
            .client
            .get(format!(
                "{}/projects/{}/queries/{}",
                self.base_url, job.project_id, job.job_id
            ))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await?;
        let results: QueryResultsJson = rest::decode_json(response).await?;
        if !results.job_complete {
            return Err(GatewayError::InvalidResponse(format!(
                "job {} is not complete",
                job.job_id
            )));
        }

        let rows = results
            .rows
            .into_iter()
            .map(|row| row.f.into_iter().map(|cell| cell.v).collect())
            .collect();
        Ok(Page::new(rows, results.page_token))
    }
}

/// Formats a row as space-separated values in brackets, e.g.
/// `[2024-05-01 weather 1]`; nulls print `<nil>` and nested records or
/// repeated fields print as bracketed lists.
#[must_use]
pub fn format_row(row: &[serde_json::Value]) -> String {
    let cells: Vec<String> = row.iter().map(format_cell).collect();
    format!("[{}]", cells.join(" "))
}

fn format_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "<nil>".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => {
            // Repeated fields arrive as `[{"v": ...}, ...]`.
            let inner: Vec<serde_json::Value> = items
                .iter()
                .map(|item| item.get("v").cloned().unwrap_or_else(|| item.clone()))
                .collect();
            format_row(&inner)
        }
        serde_json::Value::Object(map) => match map.get("f") {
            // Records arrive as `{"f": [{"v": ...}, ...]}`.
            Some(serde_json::Value::Array(fields)) => format_cell(&serde_json::Value::Array(
                fields.clone(),
            )),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every setting has a default, so a bare
//! `cargo run` serves on port 8080 against the demo project.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::GatewayError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 8080;

/// Log output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port the HTTP server binds on all interfaces.
    pub port: u16,

    /// Whether `port` came from [`DEFAULT_PORT`] rather than `PORT`.
    pub port_defaulted: bool,

    /// Google Cloud project hosting every resource.
    pub project_id: String,

    /// Spanner instance whose databases are listed.
    pub spanner_instance: String,

    /// Location used for Cloud Translation requests.
    pub translate_location: String,

    /// Location the BigQuery job runs in; must match the queried datasets.
    pub bigquery_location: String,

    /// Number of gRPC channels in the translation connection pool.
    pub translate_grpc_pool_size: usize,

    /// Spanner admin gRPC endpoint.
    pub spanner_endpoint: String,

    /// Cloud Translation gRPC endpoint.
    pub translate_grpc_endpoint: String,

    /// Cloud Translation REST base URL (including the `/v3` version).
    pub translate_rest_endpoint: String,

    /// BigQuery REST base URL (including `/bigquery/v2`).
    pub bigquery_endpoint: String,

    /// Timeout for establishing a gRPC connection.
    pub grpc_connect_timeout: Duration,

    /// Overall timeout applied by the REST client to each request.
    pub http_timeout: Duration,

    /// Pre-minted OAuth2 access token; skips metadata server discovery.
    pub access_token: Option<String>,

    /// Host (and optional port) of the GCE metadata server.
    pub metadata_host: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Loads configuration from the process environment.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if `PORT` is set but is not a valid
    /// port number.
    pub fn from_env() -> Result<Self, GatewayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] if `PORT` is set but is not a valid
    /// port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (port, port_defaulted) = match non_empty(&lookup, "PORT") {
            Some(raw) => {
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| GatewayError::Config(format!("invalid PORT: {raw}")))?;
                (port, false)
            }
            None => (DEFAULT_PORT, true),
        };

        let log_format = match non_empty(&lookup, "LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            port,
            port_defaulted,
            project_id: string_or(&lookup, "PROJECT_ID", "zatar-demo"),
            spanner_instance: string_or(&lookup, "SPANNER_INSTANCE", "test-instance"),
            translate_location: string_or(&lookup, "TRANSLATE_LOCATION", "us-central1"),
            bigquery_location: string_or(&lookup, "BIGQUERY_LOCATION", "US"),
            translate_grpc_pool_size: parse_or(&lookup, "TRANSLATE_GRPC_POOL_SIZE", 5_usize)
                .max(1),
            spanner_endpoint: string_or(
                &lookup,
                "SPANNER_ENDPOINT",
                "https://spanner.googleapis.com",
            ),
            translate_grpc_endpoint: string_or(
                &lookup,
                "TRANSLATE_GRPC_ENDPOINT",
                "https://translate.googleapis.com",
            ),
            translate_rest_endpoint: string_or(
                &lookup,
                "TRANSLATE_REST_ENDPOINT",
                "https://translate.googleapis.com/v3",
            ),
            bigquery_endpoint: string_or(
                &lookup,
                "BIGQUERY_ENDPOINT",
                "https://bigquery.googleapis.com/bigquery/v2",
            ),
            grpc_connect_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GRPC_CONNECT_TIMEOUT_SECS",
                10,
            )),
            http_timeout: Duration::from_secs(parse_or(&lookup, "HTTP_TIMEOUT_SECS", 60)),
            access_token: non_empty(&lookup, "GOOGLE_OAUTH_ACCESS_TOKEN"),
            metadata_host: string_or(&lookup, "GCE_METADATA_HOST", "metadata.google.internal"),
            log_format,
        })
    }

    /// Socket address the HTTP server binds to.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Spanner instance resource name, e.g. `projects/p/instances/i`.
    #[must_use]
    pub fn spanner_instance_path(&self) -> String {
        format!(
            "projects/{}/instances/{}",
            self.project_id, self.spanner_instance
        )
    }

    /// Translation parent resource, e.g. `projects/p/locations/us-central1`.
    #[must_use]
    pub fn translate_parent(&self) -> String {
        format!(
            "projects/{}/locations/{}",
            self.project_id, self.translate_location
        )
    }
}

/// Returns the value of `key` unless it is missing or blank.
fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    non_empty(lookup, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

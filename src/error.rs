//! Gateway error type covering every upstream transport.
//!
//! [`GatewayError`] is the central error type. Upstream failures are never
//! retried; handlers render them as text into the response body with an
//! HTTP 500 status.

use serde::Deserialize;

/// Errors raised while constructing clients or talking to Google Cloud.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Non-OK status returned by a gRPC call.
    #[error("rpc error: code = {:?} desc = {}", .0.code(), .0.message())]
    Rpc(#[from] tonic::Status),

    /// gRPC channel could not be configured.
    #[error("grpc transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    /// HTTP request failed before a response was received.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// A REST API answered with a non-success status.
    #[error("googleapi: Error {status}: {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Message extracted from the Google error envelope, or the raw body.
        message: String,
    },

    /// A BigQuery job finished with an error result.
    #[error("{reason}: {message}")]
    JobFailed {
        /// Short error code reported by BigQuery (e.g. `invalidQuery`).
        reason: String,
        /// Human-readable description.
        message: String,
    },

    /// No usable credentials could be obtained.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The remote service returned a payload this gateway cannot interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Google's JSON error envelope: `{"error": {"code": 404, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

impl GatewayError {
    /// Builds an [`GatewayError::Api`] from a failed REST response body.
    ///
    /// Falls back to the raw body when it is not a Google error envelope.
    #[must_use]
    pub fn from_api_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.trim().to_string());
        Self::Api { status, message }
    }
}

//! Shared plumbing for the JSON/HTTP clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::GatewayError;

/// Builds the `reqwest` client shared by one REST service handle.
///
/// # Errors
///
/// Returns [`GatewayError::Http`] if the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .user_agent(concat!("cloud-fanout-gateway/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Trims trailing slashes so paths can be appended with `/`.
#[must_use]
pub fn base_url(raw: &str) -> String {
    raw.trim_end_matches('/').to_string()
}

/// Decodes a successful JSON response, or turns a failed one into
/// [`GatewayError::Api`].
///
/// # Errors
///
/// Returns [`GatewayError::Api`] for non-2xx statuses,
/// [`GatewayError::Http`] if the body cannot be read and
/// [`GatewayError::InvalidResponse`] if it is not the expected JSON.
pub async fn decode_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GatewayError::from_api_body(status.as_u16(), &body));
    }
    serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

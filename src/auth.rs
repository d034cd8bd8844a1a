//! OAuth2 access tokens for outbound Google Cloud calls.
//!
//! [`TokenSource`] hands out bearer tokens to every client. A token supplied
//! through `GOOGLE_OAUTH_ACCESS_TOKEN` is used verbatim; otherwise tokens are
//! minted by the GCE metadata server and cached until shortly before expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Tokens are refreshed this long before they expire.
const EXPIRY_SKEW_SECS: i64 = 60;

const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Shared, cloneable source of bearer tokens.
#[derive(Debug, Clone)]
pub struct TokenSource {
    inner: Arc<Inner>,
}

#[derive(Debug)]
enum Inner {
    Static(String),
    Metadata(MetadataServer),
}

#[derive(Debug)]
struct MetadataServer {
    client: reqwest::Client,
    url: String,
    cache: Mutex<Option<CachedToken>>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: i64,
}

impl TokenSource {
    /// Creates a source that always returns `token`.
    #[must_use]
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner::Static(token.into())),
        }
    }

    /// Picks a credential source from configuration.
    ///
    /// When no static token is configured, one token is fetched from the
    /// metadata server so that a host without credentials fails at startup
    /// rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Credentials`] if the metadata server cannot
    /// be reached or does not return a token.
    pub async fn discover(config: &GatewayConfig) -> Result<Self, GatewayError> {
        if let Some(token) = &config.access_token {
            tracing::info!("using access token from GOOGLE_OAUTH_ACCESS_TOKEN");
            return Ok(Self::fixed(token.clone()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| GatewayError::Credentials(format!("cannot build http client: {e}")))?;
        let source = Self {
            inner: Arc::new(Inner::Metadata(MetadataServer {
                client,
                url: format!("http://{}{}", config.metadata_host, METADATA_TOKEN_PATH),
                cache: Mutex::new(None),
            })),
        };

        source.access_token().await.map_err(|e| {
            GatewayError::Credentials(format!("no default credentials available: {e}"))
        })?;
        tracing::info!(host = %config.metadata_host, "using metadata server credentials");
        Ok(source)
    }

    /// Returns a bearer token valid for at least the next minute.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Credentials`] if a fresh token cannot be
    /// fetched from the metadata server.
    pub async fn access_token(&self) -> Result<String, GatewayError> {
        match self.inner.as_ref() {
            Inner::Static(token) => Ok(token.clone()),
            Inner::Metadata(server) => server.token().await,
        }
    }
}

impl MetadataServer {
    async fn token(&self) -> Result<String, GatewayError> {
        // Holding the lock across the fetch keeps concurrent refreshes to one.
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at - ChronoDuration::seconds(EXPIRY_SKEW_SECS) > Utc::now() {
                return Ok(cached.value.clone());
            }
        }

        let response = self
            .client
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| GatewayError::Credentials(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Credentials(format!(
                "metadata server returned {status}: {}",
                body.trim()
            )));
        }
        let token: MetadataTokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Credentials(format!("malformed token response: {e}")))?;

        tracing::debug!(expires_in = token.expires_in, "refreshed metadata access token");
        let cached = CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + ChronoDuration::seconds(token.expires_in),
        };
        let value = cached.value.clone();
        *cache = Some(cached);
        Ok(value)
    }
}

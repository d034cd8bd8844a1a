//! gRPC channel construction and authorized unary calls.
//!
//! Channels connect lazily: building one validates the endpoint and TLS
//! settings up front, while the TCP/TLS handshake happens on first use.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::auth::TokenSource;
use crate::error::GatewayError;

/// Header carrying request routing parameters for Google front ends.
pub const ROUTING_HEADER: &str = "x-goog-request-params";

/// Builds a tonic `Endpoint` with connect timeout and HTTP/2 keepalive.
///
/// TLS with the bundled webpki roots is enabled for `https` URIs.
///
/// # Errors
///
/// Returns [`GatewayError::Transport`] if `uri` is not a valid URI or the
/// TLS configuration is rejected.
pub fn build_endpoint(uri: &str, connect_timeout: Duration) -> Result<Endpoint, GatewayError> {
    let mut endpoint = Endpoint::from_shared(uri.to_string())?
        .connect_timeout(connect_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true)
        .user_agent(concat!("cloud-fanout-gateway/", env!("CARGO_PKG_VERSION")))?;

    if endpoint.uri().scheme_str() == Some("https") {
        let mut tls = ClientTlsConfig::new().with_webpki_roots();
        if let Some(host) = endpoint.uri().host() {
            tls = tls.domain_name(host.to_string());
        }
        endpoint = endpoint.tls_config(tls)?;
    }
    Ok(endpoint)
}

/// Opens a lazily-connected channel to `uri`.
///
/// # Errors
///
/// See [`build_endpoint`].
pub fn lazy_channel(uri: &str, connect_timeout: Duration) -> Result<Channel, GatewayError> {
    let channel = build_endpoint(uri, connect_timeout)?.connect_lazy();
    tracing::debug!(uri, "grpc channel configured");
    Ok(channel)
}

/// Fixed-size set of channels handed out round-robin.
///
/// Each channel holds its own HTTP/2 connection, so concurrent calls are
/// spread over several connections instead of multiplexed onto one.
#[derive(Debug)]
pub struct ChannelPool {
    channels: Vec<Channel>,
    next: AtomicUsize,
}

impl ChannelPool {
    /// Opens `size` lazily-connected channels to `uri` (at least one).
    ///
    /// # Errors
    ///
    /// See [`build_endpoint`].
    pub fn connect_lazy(
        uri: &str,
        size: usize,
        connect_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let endpoint = build_endpoint(uri, connect_timeout)?;
        let channels = (0..size.max(1))
            .map(|_| endpoint.connect_lazy())
            .collect::<Vec<_>>();
        tracing::debug!(uri, size = channels.len(), "grpc channel pool configured");
        Ok(Self {
            channels,
            next: AtomicUsize::new(0),
        })
    }

    /// Number of channels in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Always `false`; a pool holds at least one channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Returns the next channel in round-robin order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`] only for an empty pool,
    /// which construction rules out.
    pub fn pick(&self) -> Result<Channel, GatewayError> {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let len = self.channels.len().max(1);
        self.channels
            .get(n % len)
            .cloned()
            .ok_or_else(|| GatewayError::InvalidResponse("empty channel pool".to_string()))
    }
}

/// Formats a routing header value, query-escaping `value`.
#[must_use]
pub fn routing_params(key: &str, value: &str) -> String {
    format!("{key}={}", urlencoding::encode(value))
}

/// Wraps `message` in a request carrying a bearer token and routing header.
///
/// # Errors
///
/// Returns [`GatewayError::Credentials`] if no token can be obtained or it
/// cannot be sent as metadata.
pub async fn authorized_request<M>(
    tokens: &TokenSource,
    message: M,
    routing: &str,
) -> Result<tonic::Request<M>, GatewayError> {
    let token = tokens.access_token().await?;
    let mut request = tonic::Request::new(message);
    let bearer: MetadataValue<Ascii> = format!("Bearer {token}")
        .parse()
        .map_err(|_| GatewayError::Credentials("access token is not valid metadata".to_string()))?;
    request.metadata_mut().insert("authorization", bearer);
    match routing.parse::<MetadataValue<Ascii>>() {
        Ok(value) => {
            request.metadata_mut().insert(ROUTING_HEADER, value);
        }
        Err(e) => tracing::warn!(routing, error = %e, "routing header dropped"),
    }
    Ok(request)
}

/// Performs one unary call of `path` on `channel`.
///
/// # Errors
///
/// Returns the [`tonic::Status`] of a failed call.
pub async fn unary<Req, Resp>(
    channel: Channel,
    path: &'static str,
    request: tonic::Request<Req>,
) -> Result<Resp, tonic::Status>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready()
        .await
        .map_err(|e| tonic::Status::unavailable(format!("service was not ready: {e}")))?;
    let codec = tonic_prost::ProstCodec::<Req, Resp>::default();
    let response = grpc
        .unary(request, PathAndQuery::from_static(path), codec)
        .await?;
    Ok(response.into_inner())
}

//! Process-wide set of long-lived service clients.

use std::sync::Arc;

use super::{
    Analytics, BigQueryClient, DatabaseAdmin, SpannerAdminClient, TextTranslator,
    TranslateGrpcClient, TranslateRestClient,
};
use crate::auth::TokenSource;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// One handle per external service, built before the server starts.
///
/// Handles are read-only after construction and shared by every request.
/// Cloning the registry clones the `Arc`s, not the clients.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    /// Spanner database administration (gRPC).
    pub database_admin: Arc<dyn DatabaseAdmin>,
    /// BigQuery (REST).
    pub analytics: Arc<dyn Analytics>,
    /// Cloud Translation over gRPC.
    pub translate_grpc: Arc<dyn TextTranslator>,
    /// Cloud Translation over REST.
    pub translate_rest: Arc<dyn TextTranslator>,
}

impl ClientRegistry {
    /// Assembles a registry from existing handles.
    #[must_use]
    pub fn new(
        database_admin: Arc<dyn DatabaseAdmin>,
        analytics: Arc<dyn Analytics>,
        translate_grpc: Arc<dyn TextTranslator>,
        translate_rest: Arc<dyn TextTranslator>,
    ) -> Self {
        Self {
            database_admin,
            analytics,
            translate_grpc,
            translate_rest,
        }
    }

    /// Discovers credentials and constructs every client, in order:
    /// Spanner admin, BigQuery, Translation (gRPC), Translation (REST).
    ///
    /// Stops at the first failure; nothing is retried.
    ///
    /// # Errors
    ///
    /// Returns the first [`GatewayError`] raised by credential discovery or
    /// client construction.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let tokens = TokenSource::discover(config).await?;

        let database_admin = SpannerAdminClient::connect(config, tokens.clone())?;
        tracing::info!(endpoint = %config.spanner_endpoint, "spanner admin grpc client ready");

        let analytics = BigQueryClient::connect(config, tokens.clone())?;
        tracing::info!(endpoint = %config.bigquery_endpoint, "bigquery http client ready");

        let translate_grpc = TranslateGrpcClient::connect(config, tokens.clone())?;
        tracing::info!(
            endpoint = %config.translate_grpc_endpoint,
            pool_size = translate_grpc.pool_size(),
            "translate grpc client ready"
        );

        let translate_rest = TranslateRestClient::connect(config, tokens)?;
        tracing::info!(endpoint = %config.translate_rest_endpoint, "translate http client ready");

        Ok(Self::new(
            Arc::new(database_admin),
            Arc::new(analytics),
            Arc::new(translate_grpc),
            Arc::new(translate_rest),
        ))
    }

    /// Releases every handle once, in construction order.
    ///
    /// Connections close when the last clone of a handle is dropped, so this
    /// is called after the server, and with it every request, has finished.
    pub fn close(self) {
        let Self {
            database_admin,
            analytics,
            translate_grpc,
            translate_rest,
        } = self;
        drop(database_admin);
        tracing::info!("spanner admin grpc client closed");
        drop(analytics);
        tracing::info!("bigquery http client closed");
        drop(translate_grpc);
        tracing::info!("translate grpc client closed");
        drop(translate_rest);
        tracing::info!("translate http client closed");
    }
}

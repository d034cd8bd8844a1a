//! Spanner database administration over gRPC.

use async_trait::async_trait;
use tonic::transport::Channel;

use super::proto::{ListDatabasesRequest, ListDatabasesResponse};
use super::{DatabaseAdmin, DatabaseInfo, Page, grpc};
use crate::auth::TokenSource;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

const LIST_DATABASES: &str = "/google.spanner.admin.database.v1.DatabaseAdmin/ListDatabases";

/// gRPC client for `google.spanner.admin.database.v1.DatabaseAdmin`.
#[derive(Debug, Clone)]
pub struct SpannerAdminClient {
    channel: Channel,
    tokens: TokenSource,
}

impl SpannerAdminClient {
    /// Creates a client on a lazily-connected channel to
    /// `config.spanner_endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the endpoint is invalid.
    pub fn connect(config: &GatewayConfig, tokens: TokenSource) -> Result<Self, GatewayError> {
        let channel = grpc::lazy_channel(&config.spanner_endpoint, config.grpc_connect_timeout)?;
        Ok(Self { channel, tokens })
    }
}

#[async_trait]
impl DatabaseAdmin for SpannerAdminClient {
    async fn list_databases_page(
        &self,
        parent: &str,
        page_token: Option<String>,
    ) -> Result<Page<DatabaseInfo>, GatewayError> {
        let message = ListDatabasesRequest {
            parent: parent.to_string(),
            page_size: 0,
            page_token: page_token.unwrap_or_default(),
        };
        let routing = grpc::routing_params("parent", parent);
        let request = grpc::authorized_request(&self.tokens, message, &routing).await?;
        let response: ListDatabasesResponse =
            grpc::unary(self.channel.clone(), LIST_DATABASES, request).await?;

        tracing::debug!(
            parent,
            count = response.databases.len(),
            "received database page"
        );
        let items = response
            .databases
            .into_iter()
            .map(|db| DatabaseInfo { name: db.name })
            .collect();
        Ok(Page::new(items, Some(response.next_page_token)))
    }
}

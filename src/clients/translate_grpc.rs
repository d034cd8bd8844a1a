//! Cloud Translation v3 over gRPC, spread across a channel pool.

use async_trait::async_trait;

use super::grpc::{self, ChannelPool};
use super::proto::{TranslateTextRequest, TranslateTextResponse};
use super::{TextTranslator, TranslateRequest, Translation, Transport};
use crate::auth::TokenSource;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

const TRANSLATE_TEXT: &str = "/google.cloud.translation.v3.TranslationService/TranslateText";

/// gRPC client for `google.cloud.translation.v3.TranslationService`.
#[derive(Debug)]
pub struct TranslateGrpcClient {
    pool: ChannelPool,
    tokens: TokenSource,
}

impl TranslateGrpcClient {
    /// Creates a client with `config.translate_grpc_pool_size` channels.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the endpoint is invalid.
    pub fn connect(config: &GatewayConfig, tokens: TokenSource) -> Result<Self, GatewayError> {
        let pool = ChannelPool::connect_lazy(
            &config.translate_grpc_endpoint,
            config.translate_grpc_pool_size,
            config.grpc_connect_timeout,
        )?;
        Ok(Self { pool, tokens })
    }

    /// Number of pooled channels.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}

#[async_trait]
impl TextTranslator for TranslateGrpcClient {
    async fn translate_text(
        &self,
        request: TranslateRequest,
    ) -> Result<Vec<Translation>, GatewayError> {
        let routing = grpc::routing_params("parent", &request.parent);
        let message = TranslateTextRequest {
            contents: request.contents,
            target_language_code: request.target_language_code,
            parent: request.parent,
            ..Default::default()
        };
        let request = grpc::authorized_request(&self.tokens, message, &routing).await?;
        let response: TranslateTextResponse =
            grpc::unary(self.pool.pick()?, TRANSLATE_TEXT, request).await?;

        Ok(response
            .translations
            .into_iter()
            .map(|t| Translation {
                translated_text: t.translated_text,
                detected_language_code: Some(t.detected_language_code)
                    .filter(|code| !code.is_empty()),
            })
            .collect())
    }

    fn transport(&self) -> Transport {
        Transport::Grpc
    }
}

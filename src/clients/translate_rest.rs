//! Cloud Translation v3 over JSON/HTTP.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::grpc::{self, ROUTING_HEADER};
use super::{TextTranslator, TranslateRequest, Translation, Transport, rest};
use crate::auth::TokenSource;
use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// REST client for the `projects.locations.translateText` method.
#[derive(Debug, Clone)]
pub struct TranslateRestClient {
    client: reqwest::Client,
    base_url: String,
    tokens: TokenSource,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextBody<'a> {
    contents: &'a [String],
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateTextReply {
    #[serde(default)]
    translations: Vec<TranslationJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslationJson {
    #[serde(default)]
    translated_text: String,
    #[serde(default)]
    detected_language_code: Option<String>,
}

impl TranslateRestClient {
    /// Creates a client for `config.translate_rest_endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Http`] if the HTTP client cannot be built.
    pub fn connect(config: &GatewayConfig, tokens: TokenSource) -> Result<Self, GatewayError> {
        Ok(Self {
            client: rest::http_client(config.http_timeout)?,
            base_url: rest::base_url(&config.translate_rest_endpoint),
            tokens,
        })
    }
}

#[async_trait]
impl TextTranslator for TranslateRestClient {
    async fn translate_text(
        &self,
        request: TranslateRequest,
    ) -> Result<Vec<Translation>, GatewayError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/{}:translateText", self.base_url, request.parent);
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(ROUTING_HEADER, grpc::routing_params("parent", &request.parent))
            .json(&TranslateTextBody {
                contents: &request.contents,
                target_language_code: &request.target_language_code,
            })
            .send()
            .await?;
        let reply: TranslateTextReply = rest::decode_json(response).await?;

        Ok(reply
            .translations
            .into_iter()
            .map(|t| Translation {
                translated_text: t.translated_text,
                detected_language_code: t.detected_language_code,
            })
            .collect())
    }

    fn transport(&self) -> Transport {
        Transport::Rest
    }
}

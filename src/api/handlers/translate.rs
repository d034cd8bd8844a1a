//! Concurrent translation endpoints, one per transport.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;

use crate::app_state::AppState;
use crate::clients::TextTranslator;
use crate::service::inputs::{GRPC_TARGET_LANGUAGE, REST_TARGET_LANGUAGE, SENTENCES};
use crate::service::{FanoutDispatcher, ResponseSink};

/// `/translategrpc` — Translate the fixed sentences to Chinese over gRPC.
#[utoipa::path(
    get,
    path = "/translategrpc",
    tag = "Translation",
    summary = "Translate over gRPC",
    description = "Translates ten fixed sentences to `zh` concurrently, one request per sentence. \
                   Lines arrive in completion order.",
    responses(
        (status = 200, description = "One `Translated text:` line per sentence", body = String, content_type = "text/plain"),
        (status = 500, description = "At least one sentence failed; one `Translate:` line per failure", body = String, content_type = "text/plain"),
    )
)]
pub async fn translate_grpc_handler(State(state): State<AppState>) -> impl IntoResponse {
    translate_sentences(
        Arc::clone(&state.clients.translate_grpc),
        &state,
        GRPC_TARGET_LANGUAGE,
    )
    .await
}

/// `/translatehttp` — Translate the fixed sentences to Arabic over REST.
#[utoipa::path(
    get,
    path = "/translatehttp",
    tag = "Translation",
    summary = "Translate over REST",
    description = "Translates ten fixed sentences to `ar` concurrently, one request per sentence. \
                   Lines arrive in completion order.",
    responses(
        (status = 200, description = "One `Translated text:` line per sentence", body = String, content_type = "text/plain"),
        (status = 500, description = "At least one sentence failed; one `Translate:` line per failure", body = String, content_type = "text/plain"),
    )
)]
pub async fn translate_http_handler(State(state): State<AppState>) -> impl IntoResponse {
    translate_sentences(
        Arc::clone(&state.clients.translate_rest),
        &state,
        REST_TARGET_LANGUAGE,
    )
    .await
}

async fn translate_sentences(
    translator: Arc<dyn TextTranslator>,
    state: &AppState,
    target_language: &str,
) -> ResponseSink {
    let sink = ResponseSink::new();
    FanoutDispatcher::new(translator, state.targets.translate_parent.clone())
        .dispatch(&SENTENCES, target_language, &sink)
        .await;
    sink
}

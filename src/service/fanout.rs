//! Concurrent per-sentence translation.
//!
//! [`FanoutDispatcher::dispatch`] spawns one task per sentence, lets each
//! write its own outcome to the shared [`ResponseSink`], and returns once
//! every task has finished. A failing task never cancels its siblings, and
//! nothing is retried. Units are detached from the caller: dropping the
//! `dispatch` future (a disconnected client) leaves them running to
//! completion.

use std::sync::Arc;

use axum::http::StatusCode;

use super::ResponseSink;
use crate::clients::{TextTranslator, TranslateRequest};

/// Per-request counts of finished translation units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutSummary {
    /// Units whose call succeeded.
    pub succeeded: usize,
    /// Units whose call failed or whose task aborted.
    pub failed: usize,
}

/// Fans sentences out to one translator.
#[derive(Debug, Clone)]
pub struct FanoutDispatcher {
    translator: Arc<dyn TextTranslator>,
    parent: String,
}

impl FanoutDispatcher {
    /// Creates a dispatcher sending requests for `parent` to `translator`.
    #[must_use]
    pub fn new(translator: Arc<dyn TextTranslator>, parent: impl Into<String>) -> Self {
        Self {
            translator,
            parent: parent.into(),
        }
    }

    /// Translates every sentence into `target_language` concurrently.
    ///
    /// Each unit writes `Translated text: <text>` per returned translation,
    /// or sets status 500 and writes `Translate: <err>`. Lines appear in
    /// completion order.
    pub async fn dispatch(
        &self,
        sentences: &[&str],
        target_language: &str,
        sink: &ResponseSink,
    ) -> FanoutSummary {
        let units: Vec<_> = sentences
            .iter()
            .map(|sentence| {
                let translator = Arc::clone(&self.translator);
                let sink = sink.clone();
                let request = TranslateRequest {
                    parent: self.parent.clone(),
                    target_language_code: target_language.to_string(),
                    contents: vec![(*sentence).to_string()],
                };
                tokio::spawn(async move { translate_one(translator.as_ref(), request, &sink).await })
            })
            .collect();

        let mut summary = FanoutSummary::default();
        for unit in units {
            match unit.await {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    tracing::error!(error = %e, "translation task aborted");
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            transport = %self.translator.transport(),
            target_language,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "translation fan-out finished"
        );
        summary
    }
}

/// Runs one unit of work; returns whether the call succeeded.
async fn translate_one(
    translator: &dyn TextTranslator,
    request: TranslateRequest,
    sink: &ResponseSink,
) -> bool {
    tracing::info!(transport = %translator.transport(), "sending translate text request");
    match translator.translate_text(request).await {
        Ok(translations) => {
            for translation in translations {
                sink.write_line(&format!("Translated text: {}", translation.translated_text));
            }
            true
        }
        Err(e) => {
            tracing::warn!(transport = %translator.transport(), error = %e, "translate request failed");
            sink.fail(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Translate: {e}\n"),
            );
            false
        }
    }
}

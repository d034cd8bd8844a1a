//! Per-request text response shared between concurrent writers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Accumulates the status and body of one plain-text response.
///
/// Clones share the same buffer, so every fan-out task of a request can
/// hold one. The first call to [`ResponseSink::fail`] fixes the status;
/// later calls only append their message. Each write is appended whole,
/// but writes from different tasks land in whatever order they happen.
#[derive(Debug, Clone, Default)]
pub struct ResponseSink {
    inner: Arc<Mutex<SinkState>>,
}

#[derive(Debug, Default)]
struct SinkState {
    status: Option<StatusCode>,
    body: String,
}

impl ResponseSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SinkState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `text` verbatim.
    pub fn write(&self, text: &str) {
        self.state().body.push_str(text);
    }

    /// Appends `line` followed by a newline.
    pub fn write_line(&self, line: &str) {
        let mut state = self.state();
        state.body.push_str(line);
        state.body.push('\n');
    }

    /// Sets `status` unless a status was already set, then appends `message`.
    pub fn fail(&self, status: StatusCode, message: &str) {
        let mut state = self.state();
        state.status.get_or_insert(status);
        state.body.push_str(message);
    }

    /// The status set so far, if any.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.state().status
    }

    /// A copy of the body written so far.
    #[must_use]
    pub fn body(&self) -> String {
        self.state().body.clone()
    }
}

impl IntoResponse for ResponseSink {
    fn into_response(self) -> Response {
        let (status, body) = {
            let mut state = self.state();
            (
                state.status.unwrap_or(StatusCode::OK),
                std::mem::take(&mut state.body),
            )
        };
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response()
    }
}

//! Service layer: the request flows behind each route.
//!
//! [`FanoutDispatcher`] drives the translation routes; the functions in
//! [`passthrough`] drive the single-call Spanner and BigQuery routes. All of
//! them write into a per-request [`ResponseSink`].

pub mod fanout;
pub mod inputs;
pub mod passthrough;
pub mod response_sink;

pub use fanout::{FanoutDispatcher, FanoutSummary};
pub use response_sink::ResponseSink;

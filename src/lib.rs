//! # cloud-fanout-gateway
//!
//! HTTP gateway that relays each route to a different Google Cloud service
//! and answers with plain text.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── Handlers (api/)
//!     │
//!     ├── FanoutDispatcher, passthrough flows, ResponseSink (service/)
//!     │
//!     ├── ClientRegistry (clients/)
//!     │     ├── Spanner admin ── gRPC (tonic)
//!     │     ├── BigQuery ─────── REST (reqwest)
//!     │     ├── Translation ──── gRPC, pooled channels
//!     │     └── Translation ──── REST
//!     │
//!     └── TokenSource (auth)
//! ```
//!
//! | Route | Upstream |
//! |---|---|
//! | `/` | none, static greeting |
//! | `/spannergrpc` | `DatabaseAdmin.ListDatabases` |
//! | `/bigqueryhttp` | BigQuery query job |
//! | `/translategrpc` | `TranslationService.TranslateText` ×10, to `zh` |
//! | `/translatehttp` | `translateText` ×10 over REST, to `ar` |

pub mod api;
pub mod app_state;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod service;

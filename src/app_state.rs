//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::clients::ClientRegistry;
use crate::config::GatewayConfig;

/// Resource names each route targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTargets {
    /// Spanner instance whose databases are listed.
    pub spanner_instance: String,
    /// Parent resource of translation requests.
    pub translate_parent: String,
    /// Location the BigQuery job runs in.
    pub bigquery_location: String,
}

impl ResourceTargets {
    /// Derives the targets from configuration.
    #[must_use]
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            spanner_instance: config.spanner_instance_path(),
            translate_parent: config.translate_parent(),
            bigquery_location: config.bigquery_location.clone(),
        }
    }
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Long-lived service clients.
    pub clients: ClientRegistry,
    /// Resources the routes operate on.
    pub targets: Arc<ResourceTargets>,
}

impl AppState {
    /// Bundles clients and targets.
    #[must_use]
    pub fn new(clients: ClientRegistry, targets: ResourceTargets) -> Self {
        Self {
            clients,
            targets: Arc::new(targets),
        }
    }
}

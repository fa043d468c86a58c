//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{IngestionService, QueryService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Webhook ingestion and enrichment refresh.
    pub ingestion: Arc<IngestionService>,
    /// Read queries over stored pools.
    pub queries: Arc<QueryService>,
    /// Expected `Authorization` header of webhook deliveries, if enforced.
    pub webhook_auth_token: Option<Arc<str>>,
    /// Name of the active persistence backend.
    pub store_backend: &'static str,
}

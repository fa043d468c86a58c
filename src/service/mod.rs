//! Service layer: business logic orchestration.
//!
//! [`IngestionService`] turns webhook payloads into stored pools and
//! refreshes their yield figures. [`QueryService`] serves the read API.

pub mod ingestion_service;
pub mod query_service;

pub use ingestion_service::{IngestReport, IngestionService, RefreshReport};
pub use query_service::QueryService;

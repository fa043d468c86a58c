//! Webhook response DTO.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::IngestReport;

/// Response body of `POST /webhook/helius`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    /// Always `true`; failures are reported per item in `report`.
    pub success: bool,
    /// What happened to each item of the payload.
    pub report: IngestReport,
}

//! OpenAPI document for the HTTP API.

use utoipa::OpenApi;

use super::dto::{PoolDetailResponse, PoolDto, PoolEventDto, PoolListResponse, WebhookResponse};
use super::handlers::{pool, system, webhook};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::IngestReport;

/// Generated OpenAPI document, served at `/api-docs/openapi.json`.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pool-indexer",
        description = "Detects Solana liquidity pool creations from Helius webhooks, enriches them with yield and token data, and serves them back."
    ),
    paths(
        webhook::helius_webhook,
        pool::list_pools,
        pool::top_apy_pools,
        pool::get_pool,
        pool::refresh_pool,
        system::health_handler,
    ),
    components(schemas(
        PoolDto,
        PoolEventDto,
        PoolListResponse,
        PoolDetailResponse,
        WebhookResponse,
        IngestReport,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Webhook", description = "Helius webhook delivery"),
        (name = "Pools", description = "Stored pools"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

//! Helius webhook receiver.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;

use crate::api::dto::WebhookResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, IndexerError};

/// `POST /webhook/helius`: Ingest a Helius enhanced-transaction delivery.
///
/// # Errors
///
/// Returns [`IndexerError::Unauthorized`] when a webhook token is configured
/// and the `Authorization` header does not match it, and
/// [`IndexerError::InvalidRequest`] when the body is not a JSON object or
/// array.
#[utoipa::path(
    post,
    path = "/webhook/helius",
    tag = "Webhook",
    summary = "Receive Helius transactions",
    description = "Accepts one enhanced transaction or an array of them. Pool-creating transactions are parsed, deduplicated, enriched and stored; every other item is skipped and counted in the report.",
    request_body(content = Object, description = "Helius enhanced transaction or array of transactions"),
    responses(
        (status = 200, description = "Payload processed", body = WebhookResponse),
        (status = 400, description = "Body is not a JSON object or array", body = ErrorResponse),
        (status = 401, description = "Missing or wrong authorization header", body = ErrorResponse),
    )
)]
pub async fn helius_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, IndexerError> {
    authorize(&headers, state.webhook_auth_token.as_deref())?;
    let items = payload_items(&body)?;
    let report = state.ingestion.process_payload(items).await;
    Ok(Json(WebhookResponse {
        success: true,
        report,
    }))
}

fn authorize(headers: &HeaderMap, expected: Option<&str>) -> Result<(), IndexerError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        tracing::warn!("rejected webhook delivery with bad authorization");
        Err(IndexerError::Unauthorized)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0_u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Normalizes the body into a list of items: an array as is, an object as
/// a single item.
fn payload_items(body: &[u8]) -> Result<Vec<Value>, IndexerError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| IndexerError::InvalidRequest(format!("body is not valid JSON: {e}")))?;
    match value {
        Value::Array(items) => Ok(items),
        object @ Value::Object(_) => Ok(vec![object]),
        _ => Err(IndexerError::InvalidRequest(
            "expected a transaction object or an array of transactions".to_string(),
        )),
    }
}

/// Webhook routes. Mounted without a request timeout.
pub fn routes() -> Router<AppState> {
    Router::new().route("/webhook/helius", post(helius_webhook))
}

//! Pool read handlers: recent list, top APY, detail, and refresh.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{ListPoolsParams, PoolDetailResponse, PoolDto, PoolListResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, IndexerError};

/// `GET /api/pools`: Most recently stored pools.
///
/// # Errors
///
/// Returns [`IndexerError`] if the store cannot be read.
#[utoipa::path(
    get,
    path = "/api/pools",
    tag = "Pools",
    summary = "List recent pools",
    description = "Returns the most recently stored pools, newest first.",
    params(ListPoolsParams),
    responses(
        (status = 200, description = "Recent pools", body = PoolListResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<ListPoolsParams>,
) -> Result<Json<PoolListResponse>, IndexerError> {
    let pools = state.queries.recent_pools(params.limit).await?;
    Ok(Json(PoolListResponse::from(pools)))
}

/// `GET /api/pools/apy`: Pools ranked by APY.
///
/// # Errors
///
/// Returns [`IndexerError`] if the store cannot be read.
#[utoipa::path(
    get,
    path = "/api/pools/apy",
    tag = "Pools",
    summary = "List pools by APY",
    description = "Returns pools with a known APY, highest first.",
    responses(
        (status = 200, description = "Pools ranked by APY", body = PoolListResponse),
        (status = 500, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn top_apy_pools(
    State(state): State<AppState>,
) -> Result<Json<PoolListResponse>, IndexerError> {
    let pools = state.queries.top_apy_pools().await?;
    Ok(Json(PoolListResponse::from(pools)))
}

/// `GET /api/pools/{address}`: One pool with its events.
///
/// # Errors
///
/// Returns [`IndexerError::PoolNotFound`] if no pool has that address.
#[utoipa::path(
    get,
    path = "/api/pools/{address}",
    tag = "Pools",
    summary = "Get pool",
    description = "Returns a stored pool and its most recent events.",
    params(("address" = String, Path, description = "Pool address")),
    responses(
        (status = 200, description = "Pool detail", body = PoolDetailResponse),
        (status = 404, description = "Pool not found", body = ErrorResponse),
    )
)]
pub async fn get_pool(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PoolDetailResponse>, IndexerError> {
    let (pool, events) = state.queries.pool_detail(&address).await?;
    Ok(Json(PoolDetailResponse {
        pool: pool.into(),
        events: events.into_iter().map(Into::into).collect(),
    }))
}

/// `POST /api/pools/{address}/refresh`: Re-fetch yield figures.
///
/// # Errors
///
/// Returns [`IndexerError::PoolNotFound`] if no pool has that address and
/// [`IndexerError::Upstream`] if the yield API keeps failing.
#[utoipa::path(
    post,
    path = "/api/pools/{address}/refresh",
    tag = "Pools",
    summary = "Refresh pool enrichment",
    description = "Looks the pool's tokens up in the yield listing again and stores the new APY, TVL and volume.",
    params(("address" = String, Path, description = "Pool address")),
    responses(
        (status = 200, description = "Updated pool", body = PoolDto),
        (status = 404, description = "Pool not found", body = ErrorResponse),
        (status = 502, description = "Yield API unavailable", body = ErrorResponse),
    )
)]
pub async fn refresh_pool(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<PoolDto>, IndexerError> {
    let pool = state.ingestion.refresh_enrichment(&address).await?;
    Ok(Json(pool.into()))
}

/// Pool routes mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pools", get(list_pools))
        .route("/pools/apy", get(top_apy_pools))
        .route("/pools/{address}", get(get_pool))
        .route("/pools/{address}/refresh", post(refresh_pool))
}

//! Pool DTOs for the read API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::{PoolEventRecord, PoolId, PoolRecord};

/// Query parameters of `GET /api/pools`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPoolsParams {
    /// Page size. Defaults to the configured list limit, clamped to 1..=500.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// A stored pool as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolDto {
    /// Pool identifier.
    pub id: PoolId,
    /// On-chain pool account, or the creating signature when none was found.
    pub pool_address: String,
    /// `true` when `pool_address` is the fallback signature.
    pub address_is_fallback: bool,
    /// First token mint.
    pub token_a: String,
    /// Second token mint.
    pub token_b: String,
    /// Creating transaction signature.
    pub signature: String,
    /// Originating protocol as reported by Helius.
    pub source: String,
    /// APY in percent.
    pub apy: Option<f64>,
    /// Total value locked in USD.
    pub tvl: Option<f64>,
    /// Trailing 24h volume in USD.
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<f64>,
    /// Block time of the creating transaction.
    pub timestamp: DateTime<Utc>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Last enrichment update.
    pub updated_at: DateTime<Utc>,
}

impl From<PoolRecord> for PoolDto {
    fn from(record: PoolRecord) -> Self {
        Self {
            id: record.id,
            pool_address: record.pool_address,
            address_is_fallback: record.address_is_fallback,
            token_a: record.token_a,
            token_b: record.token_b,
            signature: record.signature,
            source: record.source,
            apy: record.enrichment.apy,
            tvl: record.enrichment.tvl,
            volume_24h: record.enrichment.volume_24h,
            timestamp: record.timestamp,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// A pool event as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoolEventDto {
    /// Event identifier.
    pub id: Uuid,
    /// `"created"` or `"enrichment_refreshed"`.
    pub event_type: String,
    /// Token A amount moved by the creating transaction.
    pub amount: Option<f64>,
    /// Unique event signature.
    pub signature: String,
    /// Enrichment snapshot taken when the event was recorded.
    #[schema(value_type = Object)]
    pub raw_data: serde_json::Value,
    /// Event time.
    pub timestamp: DateTime<Utc>,
}

impl From<PoolEventRecord> for PoolEventDto {
    fn from(record: PoolEventRecord) -> Self {
        Self {
            id: record.id,
            event_type: record.event_type.as_str().to_string(),
            amount: record.amount,
            signature: record.signature,
            raw_data: record.raw_data,
            timestamp: record.timestamp,
        }
    }
}

/// Response body of the pool list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolListResponse {
    /// Number of pools in `pools`.
    pub total: usize,
    /// Pools in endpoint order.
    pub pools: Vec<PoolDto>,
}

impl From<Vec<PoolRecord>> for PoolListResponse {
    fn from(records: Vec<PoolRecord>) -> Self {
        let pools: Vec<PoolDto> = records.into_iter().map(PoolDto::from).collect();
        Self {
            total: pools.len(),
            pools,
        }
    }
}

/// Response body of `GET /api/pools/{address}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PoolDetailResponse {
    /// The pool.
    pub pool: PoolDto,
    /// Its most recent events, newest first.
    pub events: Vec<PoolEventDto>,
}

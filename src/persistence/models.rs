//! Database row types for the `pools` and `pool_events` tables.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Enrichment, PoolEventKind, PoolEventRecord, PoolId, PoolRecord};
use crate::error::IndexerError;

/// Column list selected for every pool query.
pub const POOL_COLUMNS: &str = "id, pool_address, address_is_fallback, token_a, token_b, \
     signature, source, apy, tvl, volume_24h, block_time, created_at, updated_at";

/// Column list selected for every event query.
pub const EVENT_COLUMNS: &str =
    "id, pool_id, event_type, amount, signature, raw_data, occurred_at";

/// A row from the `pools` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PoolRow {
    /// Surrogate key.
    pub id: Uuid,
    /// Pool account or fallback signature.
    pub pool_address: String,
    /// Whether `pool_address` is the fallback signature.
    pub address_is_fallback: bool,
    /// First token mint.
    pub token_a: String,
    /// Second token mint.
    pub token_b: String,
    /// Creating transaction signature.
    pub signature: String,
    /// Originating protocol name.
    pub source: String,
    /// APY in percent.
    pub apy: Option<f64>,
    /// TVL in USD.
    pub tvl: Option<f64>,
    /// 24h volume in USD.
    pub volume_24h: Option<f64>,
    /// Block time of the creating transaction.
    pub block_time: DateTime<Utc>,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl From<PoolRow> for PoolRecord {
    fn from(row: PoolRow) -> Self {
        Self {
            id: PoolId::from_uuid(row.id),
            pool_address: row.pool_address,
            address_is_fallback: row.address_is_fallback,
            token_a: row.token_a,
            token_b: row.token_b,
            signature: row.signature,
            source: row.source,
            enrichment: Enrichment {
                apy: row.apy,
                tvl: row.tvl,
                volume_24h: row.volume_24h,
            },
            timestamp: row.block_time,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `pool_events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PoolEventRow {
    /// Row id.
    pub id: Uuid,
    /// Owning pool.
    pub pool_id: Uuid,
    /// Event type discriminator (e.g. `"created"`).
    pub event_type: String,
    /// Token amount, if any.
    pub amount: Option<f64>,
    /// Unique event signature.
    pub signature: String,
    /// JSONB enrichment snapshot.
    pub raw_data: serde_json::Value,
    /// Event time.
    pub occurred_at: DateTime<Utc>,
}

impl TryFrom<PoolEventRow> for PoolEventRecord {
    type Error = IndexerError;

    fn try_from(row: PoolEventRow) -> Result<Self, Self::Error> {
        let event_type = PoolEventKind::from_db(&row.event_type).ok_or_else(|| {
            IndexerError::Persistence(format!("unknown event type {:?}", row.event_type))
        })?;
        Ok(Self {
            id: row.id,
            pool_id: PoolId::from_uuid(row.pool_id),
            event_type,
            amount: row.amount,
            signature: row.signature,
            raw_data: row.raw_data,
            timestamp: row.occurred_at,
        })
    }
}

//! Persisted pool rows and the enrichment values attached to them.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{PoolCandidate, PoolId};

/// Yield figures sourced from the external yield API.
///
/// Every field is independently nullable: a listing may carry APY without
/// volume, and a failed lookup leaves all three empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    /// Annualized yield, in percent.
    pub apy: Option<f64>,
    /// Total value locked, in USD.
    pub tvl: Option<f64>,
    /// Trailing 24h volume, in USD.
    pub volume_24h: Option<f64>,
}

impl Enrichment {
    /// Returns `true` if no figure is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apy.is_none() && self.tvl.is_none() && self.volume_24h.is_none()
    }
}

/// Insert payload for a new pool row.
#[derive(Debug, Clone)]
pub struct NewPool {
    /// Detected pair and identity.
    pub candidate: PoolCandidate,
    /// Yield figures known at ingestion time.
    pub enrichment: Enrichment,
}

/// A pool row as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    /// Surrogate key.
    pub id: PoolId,
    /// Pool account (or the signature, see `address_is_fallback`). Unique.
    pub pool_address: String,
    /// Whether `pool_address` is the fallback signature.
    pub address_is_fallback: bool,
    /// First token mint.
    pub token_a: String,
    /// Second token mint.
    pub token_b: String,
    /// Creating transaction signature. Unique.
    pub signature: String,
    /// Originating protocol name.
    pub source: String,
    /// Yield figures.
    #[serde(flatten)]
    pub enrichment: Enrichment,
    /// Block time of the creating transaction.
    pub timestamp: DateTime<Utc>,
    /// Row insertion time.
    pub created_at: DateTime<Utc>,
    /// Last enrichment update.
    pub updated_at: DateTime<Utc>,
}

impl PoolRecord {
    /// Builds the row that an insert of `new` produces at time `now`.
    #[must_use]
    pub fn from_new(id: PoolId, new: NewPool, now: DateTime<Utc>) -> Self {
        let NewPool {
            candidate,
            enrichment,
        } = new;
        Self {
            id,
            pool_address: candidate.pool_address,
            address_is_fallback: candidate.address_is_fallback,
            token_a: candidate.token_a,
            token_b: candidate.token_b,
            signature: candidate.signature,
            source: candidate.source,
            enrichment,
            timestamp: candidate.timestamp,
            created_at: now,
            updated_at: now,
        }
    }
}

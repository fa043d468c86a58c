//! Pool candidate derived from a single transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Source tag used when the notification does not name its protocol.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A liquidity pair detected in a transaction, before enrichment.
///
/// Transient: built per webhook item and either persisted as a
/// [`super::PoolRecord`] or dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolCandidate {
    /// First non-native mint in transfer order.
    pub token_a: String,
    /// Second distinct non-native mint in transfer order.
    pub token_b: String,
    /// Best-effort pool account.
    pub pool_address: String,
    /// `true` when no account qualified and the signature stands in for
    /// the pool address.
    pub address_is_fallback: bool,
    /// Signature of the creating transaction.
    pub signature: String,
    /// Block time of the creating transaction.
    pub timestamp: DateTime<Utc>,
    /// Originating protocol name.
    pub source: String,
}

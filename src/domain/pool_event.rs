//! Append-only events recorded against a stored pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PoolId;

/// What happened to the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolEventKind {
    /// Pool detected and first stored.
    Created,
    /// Yield figures were fetched again and written back.
    EnrichmentRefreshed,
}

impl PoolEventKind {
    /// Returns the event type as stored in the `event_type` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::EnrichmentRefreshed => "enrichment_refreshed",
        }
    }

    /// Parses a stored `event_type` value.
    #[must_use]
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "enrichment_refreshed" => Some(Self::EnrichmentRefreshed),
            _ => None,
        }
    }
}

/// Insert payload for a new event row.
#[derive(Debug, Clone)]
pub struct NewPoolEvent {
    /// Owning pool.
    pub pool_id: PoolId,
    /// Event type.
    pub kind: PoolEventKind,
    /// Token amount involved, when one applies.
    pub amount: Option<f64>,
    /// Unique signature of the event.
    pub signature: String,
    /// Enrichment snapshot at the time of the event.
    pub raw_data: serde_json::Value,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
}

/// An event row as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolEventRecord {
    /// Row id.
    pub id: Uuid,
    /// Owning pool.
    pub pool_id: PoolId,
    /// Event type.
    pub event_type: PoolEventKind,
    /// Token amount involved, when one applies.
    pub amount: Option<f64>,
    /// Unique signature of the event.
    pub signature: String,
    /// Enrichment snapshot at the time of the event.
    pub raw_data: serde_json::Value,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
}

impl PoolEventRecord {
    /// Builds the row that an insert of `new` produces.
    #[must_use]
    pub fn from_new(id: Uuid, new: NewPoolEvent) -> Self {
        Self {
            id,
            pool_id: new.pool_id,
            event_type: new.kind,
            amount: new.amount,
            signature: new.signature,
            raw_data: new.raw_data,
            timestamp: new.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_through_column_value() {
        for kind in [PoolEventKind::Created, PoolEventKind::EnrichmentRefreshed] {
            assert_eq!(PoolEventKind::from_db(kind.as_str()), Some(kind));
        }
        assert_eq!(PoolEventKind::from_db("swap"), None);
    }

    #[test]
    fn serializes_event_type_in_snake_case() {
        let json = serde_json::to_string(&PoolEventKind::EnrichmentRefreshed).unwrap_or_default();
        assert_eq!(json, "\"enrichment_refreshed\"");
    }
}

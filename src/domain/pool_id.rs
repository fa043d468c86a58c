//! Surrogate key of a stored pool.
//!
//! Distinct from the on-chain pool address: a pool whose address fell back
//! to its signature still gets a [`PoolId`], and events point at the pool
//! through it.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Row id of a stored pool, bound to the `UUID` columns as is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[serde(transparent)]
#[sqlx(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct PoolId(Uuid);

impl PoolId {
    /// Fresh random id for a pool about to be inserted.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an id read back from storage.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PoolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(PoolId::new(), PoolId::new());
    }

    #[test]
    fn serializes_and_displays_as_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = PoolId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{uuid}\""));
        assert_eq!(id.to_string(), uuid.to_string());
        assert_eq!(id.as_uuid(), &uuid);
    }
}

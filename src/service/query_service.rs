//! Read-side service backing the pool query endpoints.

use std::sync::Arc;

use crate::domain::{PoolEventRecord, PoolRecord};
use crate::error::IndexerError;
use crate::persistence::PoolStore;

/// Largest page any list endpoint returns.
pub const MAX_LIST_LIMIT: u32 = 500;

/// Events returned with a pool detail.
pub const DETAIL_EVENT_LIMIT: u32 = 100;

/// Read queries over stored pools.
#[derive(Debug)]
pub struct QueryService {
    store: Arc<PoolStore>,
    default_list_limit: u32,
    apy_list_limit: u32,
}

impl QueryService {
    /// Creates the service with the configured page sizes.
    #[must_use]
    pub fn new(store: Arc<PoolStore>, default_list_limit: u32, apy_list_limit: u32) -> Self {
        Self {
            store,
            default_list_limit,
            apy_list_limit,
        }
    }

    /// Effective page size: the requested one or the default, within
    /// `1..=MAX_LIST_LIMIT`.
    #[must_use]
    pub fn list_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, MAX_LIST_LIMIT)
    }

    /// Most recently stored pools.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the store cannot be read.
    pub async fn recent_pools(&self, limit: Option<u32>) -> Result<Vec<PoolRecord>, IndexerError> {
        self.store.recent_pools(self.list_limit(limit)).await
    }

    /// Pools with a known APY, highest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the store cannot be read.
    pub async fn top_apy_pools(&self) -> Result<Vec<PoolRecord>, IndexerError> {
        let limit = self.apy_list_limit.clamp(1, MAX_LIST_LIMIT);
        let mut pools = self.store.top_apy_pools(limit).await?;
        pools.retain(|p| p.enrichment.apy.is_some());
        Ok(pools)
    }

    /// A pool and its most recent events.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::PoolNotFound`] for an unknown address, or a
    /// persistence error.
    pub async fn pool_detail(
        &self,
        pool_address: &str,
    ) -> Result<(PoolRecord, Vec<PoolEventRecord>), IndexerError> {
        let pool = self
            .store
            .find_pool(pool_address)
            .await?
            .ok_or_else(|| IndexerError::PoolNotFound(pool_address.to_string()))?;
        let events = self.store.pool_events(pool.id, DETAIL_EVENT_LIMIT).await?;
        Ok((pool, events))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::domain::{Enrichment, NewPool, PoolCandidate};
    use crate::persistence::MemoryPoolStore;

    async fn seeded() -> QueryService {
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        for (i, apy) in [Some(5.0), None, Some(30.0)].into_iter().enumerate() {
            let new = NewPool {
                candidate: PoolCandidate {
                    token_a: "MintA".to_string(),
                    token_b: "MintB".to_string(),
                    pool_address: format!("Pool{i}"),
                    address_is_fallback: false,
                    signature: format!("sig{i}"),
                    timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
                        .unwrap_or_default(),
                    source: "ORCA".to_string(),
                },
                enrichment: Enrichment {
                    apy,
                    ..Enrichment::default()
                },
            };
            let Ok(Some(_)) = store.insert_pool(new).await else {
                panic!("seed pool");
            };
        }
        QueryService::new(store, 50, 25)
    }

    #[test]
    fn list_limit_defaults_and_clamps() {
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = QueryService::new(store, 50, 25);
        assert_eq!(service.list_limit(None), 50);
        assert_eq!(service.list_limit(Some(0)), 1);
        assert_eq!(service.list_limit(Some(10)), 10);
        assert_eq!(service.list_limit(Some(10_000)), MAX_LIST_LIMIT);
    }

    #[tokio::test]
    async fn recent_pools_respects_limit() {
        let service = seeded().await;
        let Ok(pools) = service.recent_pools(Some(2)).await else {
            panic!("query succeeds");
        };
        let addresses: Vec<&str> = pools.iter().map(|p| p.pool_address.as_str()).collect();
        assert_eq!(addresses, vec!["Pool2", "Pool1"]);
    }

    #[tokio::test]
    async fn top_apy_excludes_unknown_apy() {
        let service = seeded().await;
        let Ok(pools) = service.top_apy_pools().await else {
            panic!("query succeeds");
        };
        let addresses: Vec<&str> = pools.iter().map(|p| p.pool_address.as_str()).collect();
        assert_eq!(addresses, vec!["Pool2", "Pool0"]);
    }

    #[tokio::test]
    async fn pool_detail_reports_missing_pool() {
        let service = seeded().await;
        assert!(service.pool_detail("Pool1").await.is_ok());
        assert!(matches!(
            service.pool_detail("Nope").await,
            Err(IndexerError::PoolNotFound(_))
        ));
    }
}

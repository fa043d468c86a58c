//! In-memory pool store.
//!
//! Mirrors the uniqueness rules of the PostgreSQL schema. Used when
//! persistence is disabled and as the store behind service tests.

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Enrichment, NewPool, NewPoolEvent, PoolEventRecord, PoolId, PoolRecord};

#[derive(Debug, Default)]
struct MemoryState {
    // insertion order
    pools: Vec<PoolRecord>,
    events: Vec<PoolEventRecord>,
}

/// Process-local pool store behind a [`tokio::sync::RwLock`].
#[derive(Debug, Default)]
pub struct MemoryPoolStore {
    state: RwLock<MemoryState>,
}

fn take(limit: u32) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

impl MemoryPoolStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if a pool is stored under `pool_address`.
    pub async fn pool_exists(&self, pool_address: &str) -> bool {
        let state = self.state.read().await;
        state.pools.iter().any(|p| p.pool_address == pool_address)
    }

    /// Inserts a pool unless its address or signature is already stored.
    pub async fn insert_pool(&self, new: NewPool) -> Option<PoolRecord> {
        let mut state = self.state.write().await;
        let conflict = state.pools.iter().any(|p| {
            p.pool_address == new.candidate.pool_address || p.signature == new.candidate.signature
        });
        if conflict {
            return None;
        }
        let record = PoolRecord::from_new(PoolId::new(), new, Utc::now());
        state.pools.push(record.clone());
        Some(record)
    }

    /// Appends an event unless its signature is already stored.
    pub async fn insert_event(&self, new: NewPoolEvent) -> Option<PoolEventRecord> {
        let mut state = self.state.write().await;
        if state.events.iter().any(|e| e.signature == new.signature) {
            return None;
        }
        let record = PoolEventRecord::from_new(Uuid::new_v4(), new);
        state.events.push(record.clone());
        Some(record)
    }

    /// Most recently inserted pools first.
    pub async fn recent_pools(&self, limit: u32) -> Vec<PoolRecord> {
        let state = self.state.read().await;
        state.pools.iter().rev().take(take(limit)).cloned().collect()
    }

    /// Pools with a known APY, highest first.
    pub async fn top_apy_pools(&self, limit: u32) -> Vec<PoolRecord> {
        let state = self.state.read().await;
        let mut pools: Vec<PoolRecord> = state
            .pools
            .iter()
            .filter(|p| p.enrichment.apy.is_some())
            .cloned()
            .collect();
        pools.sort_by(|a, b| {
            let a = a.enrichment.apy.unwrap_or(f64::MIN);
            let b = b.enrichment.apy.unwrap_or(f64::MIN);
            b.total_cmp(&a)
        });
        pools.truncate(take(limit));
        pools
    }

    /// Pools still lacking an APY, least recently updated first.
    pub async fn pools_missing_apy(&self, limit: u32) -> Vec<PoolRecord> {
        let state = self.state.read().await;
        let mut pools: Vec<PoolRecord> = state
            .pools
            .iter()
            .filter(|p| p.enrichment.apy.is_none())
            .cloned()
            .collect();
        // stable: ties keep insertion order
        pools.sort_by_key(|p| p.updated_at);
        pools.truncate(take(limit));
        pools
    }

    /// Bumps `updated_at` of a pool without touching its figures.
    pub async fn touch_pool(&self, pool_id: PoolId) {
        let mut state = self.state.write().await;
        if let Some(pool) = state.pools.iter_mut().find(|p| p.id == pool_id) {
            pool.updated_at = Utc::now();
        }
    }

    /// Looks up a pool by its address.
    pub async fn find_pool(&self, pool_address: &str) -> Option<PoolRecord> {
        let state = self.state.read().await;
        state
            .pools
            .iter()
            .find(|p| p.pool_address == pool_address)
            .cloned()
    }

    /// Events of a pool, newest first.
    pub async fn pool_events(&self, pool_id: PoolId, limit: u32) -> Vec<PoolEventRecord> {
        let state = self.state.read().await;
        state
            .events
            .iter()
            .rev()
            .filter(|e| e.pool_id == pool_id)
            .take(take(limit))
            .cloned()
            .collect()
    }

    /// Overwrites the yield figures of a pool.
    pub async fn update_enrichment(
        &self,
        pool_id: PoolId,
        enrichment: Enrichment,
    ) -> Option<PoolRecord> {
        let mut state = self.state.write().await;
        let pool = state.pools.iter_mut().find(|p| p.id == pool_id)?;
        pool.enrichment = enrichment;
        pool.updated_at = Utc::now();
        Some(pool.clone())
    }
}

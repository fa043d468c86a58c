//! Persistence layer: pool and event storage.
//!
//! [`PoolStore`] is the single entry point used by the services. It
//! dispatches to PostgreSQL (`sqlx::PgPool`) or, when persistence is
//! disabled, to a process-local store with the same uniqueness rules.

pub mod memory;
pub mod models;
pub mod postgres;

pub use memory::MemoryPoolStore;
pub use postgres::PostgresPoolStore;

use crate::domain::{Enrichment, NewPool, NewPoolEvent, PoolEventRecord, PoolId, PoolRecord};
use crate::error::IndexerError;

/// Storage backend for pools and their events.
///
/// Uniqueness: one pool per `pool_address` and per `signature`; one event
/// per `signature`. Inserts that would break it return `Ok(None)`.
#[derive(Debug)]
pub enum PoolStore {
    /// PostgreSQL tables `pools` and `pool_events`.
    Postgres(PostgresPoolStore),
    /// Process-local storage.
    Memory(MemoryPoolStore),
}

impl PoolStore {
    /// Short backend name for the health report.
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Returns `true` if a pool is stored under `pool_address`.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn pool_exists(&self, pool_address: &str) -> Result<bool, IndexerError> {
        match self {
            Self::Postgres(s) => s.pool_exists(pool_address).await,
            Self::Memory(s) => Ok(s.pool_exists(pool_address).await),
        }
    }

    /// Inserts a pool if neither its address nor signature is stored yet.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn insert_pool(&self, new: NewPool) -> Result<Option<PoolRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.insert_pool(new).await,
            Self::Memory(s) => Ok(s.insert_pool(new).await),
        }
    }

    /// Appends an event if its signature is not stored yet.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn insert_event(
        &self,
        new: NewPoolEvent,
    ) -> Result<Option<PoolEventRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.insert_event(new).await,
            Self::Memory(s) => Ok(s.insert_event(new).await),
        }
    }

    /// Most recently inserted pools first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn recent_pools(&self, limit: u32) -> Result<Vec<PoolRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.recent_pools(limit).await,
            Self::Memory(s) => Ok(s.recent_pools(limit).await),
        }
    }

    /// Pools with a known APY, highest first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn top_apy_pools(&self, limit: u32) -> Result<Vec<PoolRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.top_apy_pools(limit).await,
            Self::Memory(s) => Ok(s.top_apy_pools(limit).await),
        }
    }

    /// Pools still lacking an APY, least recently updated first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn pools_missing_apy(&self, limit: u32) -> Result<Vec<PoolRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.pools_missing_apy(limit).await,
            Self::Memory(s) => Ok(s.pools_missing_apy(limit).await),
        }
    }

    /// Looks up a pool by its address.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn find_pool(&self, pool_address: &str) -> Result<Option<PoolRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.find_pool(pool_address).await,
            Self::Memory(s) => Ok(s.find_pool(pool_address).await),
        }
    }

    /// Events of a pool, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn pool_events(
        &self,
        pool_id: PoolId,
        limit: u32,
    ) -> Result<Vec<PoolEventRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.pool_events(pool_id, limit).await,
            Self::Memory(s) => Ok(s.pool_events(pool_id, limit).await),
        }
    }

    /// Overwrites the yield figures of a pool. `None` if the pool is gone.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn update_enrichment(
        &self,
        pool_id: PoolId,
        enrichment: Enrichment,
    ) -> Result<Option<PoolRecord>, IndexerError> {
        match self {
            Self::Postgres(s) => s.update_enrichment(pool_id, enrichment).await,
            Self::Memory(s) => Ok(s.update_enrichment(pool_id, enrichment).await),
        }
    }

    /// Bumps `updated_at` so the pool goes to the back of the
    /// [`PoolStore::pools_missing_apy`] queue.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn touch_pool(&self, pool_id: PoolId) -> Result<(), IndexerError> {
        match self {
            Self::Postgres(s) => s.touch_pool(pool_id).await,
            Self::Memory(s) => {
                s.touch_pool(pool_id).await;
                Ok(())
            }
        }
    }

    /// Releases backend resources. Called once on shutdown.
    pub async fn close(&self) {
        if let Self::Postgres(s) = self {
            s.close().await;
        }
    }
}

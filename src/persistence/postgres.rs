//! PostgreSQL implementation of the pool store.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{EVENT_COLUMNS, POOL_COLUMNS, PoolEventRow, PoolRow};
use crate::config::IndexerConfig;
use crate::domain::{Enrichment, NewPool, NewPoolEvent, PoolEventRecord, PoolId, PoolRecord};
use crate::error::IndexerError;

/// PostgreSQL-backed pool store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPoolStore {
    pool: PgPool,
}

fn db_error(e: sqlx::Error) -> IndexerError {
    IndexerError::Persistence(e.to_string())
}

fn to_i64(limit: u32) -> i64 {
    i64::from(limit)
}

impl PostgresPoolStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens the connection pool and, if configured, applies the embedded
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &IndexerConfig) -> Result<Self, IndexerError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await
            .map_err(db_error)?;

        if config.database_run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| IndexerError::Persistence(e.to_string()))?;
            tracing::info!("database migrations applied");
        }

        Ok(Self::new(pool))
    }

    /// Returns `true` if a pool is stored under `pool_address`.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn pool_exists(&self, pool_address: &str) -> Result<bool, IndexerError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM pools WHERE pool_address = $1)")
            .bind(pool_address)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    /// Inserts a pool unless its address or signature is already stored.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn insert_pool(&self, new: NewPool) -> Result<Option<PoolRecord>, IndexerError> {
        let NewPool {
            candidate,
            enrichment,
        } = new;
        let sql = format!(
            "INSERT INTO pools (id, pool_address, address_is_fallback, token_a, token_b, \
             signature, source, apy, tvl, volume_24h, block_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT DO NOTHING RETURNING {POOL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PoolRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&candidate.pool_address)
            .bind(candidate.address_is_fallback)
            .bind(&candidate.token_a)
            .bind(&candidate.token_b)
            .bind(&candidate.signature)
            .bind(&candidate.source)
            .bind(enrichment.apy)
            .bind(enrichment.tvl)
            .bind(enrichment.volume_24h)
            .bind(candidate.timestamp)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(PoolRecord::from))
    }

    /// Appends an event unless its signature is already stored.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn insert_event(
        &self,
        new: NewPoolEvent,
    ) -> Result<Option<PoolEventRecord>, IndexerError> {
        let sql = format!(
            "INSERT INTO pool_events (id, pool_id, event_type, amount, signature, raw_data, occurred_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (signature) DO NOTHING RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PoolEventRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.pool_id)
            .bind(new.kind.as_str())
            .bind(new.amount)
            .bind(&new.signature)
            .bind(&new.raw_data)
            .bind(new.timestamp)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(PoolEventRecord::try_from).transpose()
    }

    /// Most recently inserted pools first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn recent_pools(&self, limit: u32) -> Result<Vec<PoolRecord>, IndexerError> {
        let sql = format!("SELECT {POOL_COLUMNS} FROM pools ORDER BY created_at DESC LIMIT $1");
        self.fetch_pools(&sql, to_i64(limit)).await
    }

    /// Pools with a known APY, highest first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn top_apy_pools(&self, limit: u32) -> Result<Vec<PoolRecord>, IndexerError> {
        let sql = format!(
            "SELECT {POOL_COLUMNS} FROM pools WHERE apy IS NOT NULL \
             ORDER BY apy DESC LIMIT $1"
        );
        self.fetch_pools(&sql, to_i64(limit)).await
    }

    /// Pools still lacking an APY, least recently updated first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn pools_missing_apy(&self, limit: u32) -> Result<Vec<PoolRecord>, IndexerError> {
        let sql = format!(
            "SELECT {POOL_COLUMNS} FROM pools WHERE apy IS NULL \
             ORDER BY updated_at ASC, created_at ASC LIMIT $1"
        );
        self.fetch_pools(&sql, to_i64(limit)).await
    }

    /// Looks up a pool by its address.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn find_pool(&self, pool_address: &str) -> Result<Option<PoolRecord>, IndexerError> {
        let sql = format!("SELECT {POOL_COLUMNS} FROM pools WHERE pool_address = $1");
        let row = sqlx::query_as::<_, PoolRow>(&sql)
            .bind(pool_address)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(PoolRecord::from))
    }

    /// Events of a pool, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure or if a
    /// stored event type is unknown.
    pub async fn pool_events(
        &self,
        pool_id: PoolId,
        limit: u32,
    ) -> Result<Vec<PoolEventRecord>, IndexerError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM pool_events WHERE pool_id = $1 \
             ORDER BY occurred_at DESC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, PoolEventRow>(&sql)
            .bind(pool_id)
            .bind(to_i64(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(PoolEventRecord::try_from).collect()
    }

    /// Overwrites the yield figures of a pool.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn update_enrichment(
        &self,
        pool_id: PoolId,
        enrichment: Enrichment,
    ) -> Result<Option<PoolRecord>, IndexerError> {
        let sql = format!(
            "UPDATE pools SET apy = $2, tvl = $3, volume_24h = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {POOL_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PoolRow>(&sql)
            .bind(pool_id)
            .bind(enrichment.apy)
            .bind(enrichment.tvl)
            .bind(enrichment.volume_24h)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(PoolRecord::from))
    }

    /// Bumps `updated_at` of a pool without touching its figures.
    ///
    /// # Errors
    ///
    /// Returns a [`IndexerError::Persistence`] on database failure.
    pub async fn touch_pool(&self, pool_id: PoolId) -> Result<(), IndexerError> {
        sqlx::query("UPDATE pools SET updated_at = $2 WHERE id = $1")
            .bind(pool_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Closes every connection of the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn fetch_pools(&self, sql: &str, limit: i64) -> Result<Vec<PoolRecord>, IndexerError> {
        let rows = sqlx::query_as::<_, PoolRow>(sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(PoolRecord::from).collect())
    }
}

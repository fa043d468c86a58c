//! Ingestion service: webhook batch → detected, enriched, stored pools.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::clients::{TokenClient, TokenInfo, YieldClient, YieldPool};
use crate::domain::{
    Enrichment, NewPool, NewPoolEvent, PoolCandidate, PoolEventKind, PoolRecord,
    TransactionNotification,
};
use crate::error::IndexerError;
use crate::parser::{ParseError, TransactionParser};
use crate::persistence::PoolStore;

/// Per-payload tally returned to the webhook caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    /// Items in the payload.
    pub received: usize,
    /// Items whose `type` is not a pool-creating type.
    pub ignored_type: usize,
    /// Items that were malformed or did not describe a pair.
    pub rejected: usize,
    /// Items whose pool address was already stored.
    pub duplicates: usize,
    /// New pools stored.
    pub created: usize,
    /// Items that failed on a storage error.
    pub failed: usize,
}

/// Tally of one background refresh pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Pools examined.
    pub checked: usize,
    /// Pools that received an APY.
    pub updated: usize,
    /// Pools whose update failed.
    pub failed: usize,
}

enum ItemOutcome {
    IgnoredType,
    Rejected,
    Duplicate,
    Created,
    Failed,
}

impl IngestReport {
    fn record(&mut self, outcome: &ItemOutcome) {
        let counter = match outcome {
            ItemOutcome::IgnoredType => &mut self.ignored_type,
            ItemOutcome::Rejected => &mut self.rejected,
            ItemOutcome::Duplicate => &mut self.duplicates,
            ItemOutcome::Created => &mut self.created,
            ItemOutcome::Failed => &mut self.failed,
        };
        *counter += 1;
    }
}

/// External data gathered for one candidate. Every part is optional.
#[derive(Debug, Default)]
struct EnrichmentResult {
    yield_pool: Option<YieldPool>,
    token_a: Option<TokenInfo>,
    token_b: Option<TokenInfo>,
}

impl EnrichmentResult {
    fn figures(&self) -> Enrichment {
        self.yield_pool
            .as_ref()
            .map(YieldPool::enrichment)
            .unwrap_or_default()
    }

    fn raw_data(&self, candidate: &PoolCandidate) -> serde_json::Value {
        serde_json::json!({
            "tokenA": self.token_a,
            "tokenB": self.token_b,
            "yieldPool": self.yield_pool,
            "source": candidate.source,
            "addressIsFallback": candidate.address_is_fallback,
        })
    }
}

/// Sequences parse → dedup → enrich → store for webhook payloads.
///
/// Items are handled one at a time in payload order. A failure is
/// contained to its item: it is logged, counted, and the loop moves on.
#[derive(Debug)]
pub struct IngestionService {
    parser: TransactionParser,
    store: Arc<PoolStore>,
    yields: Arc<YieldClient>,
    tokens: Arc<TokenClient>,
}

impl IngestionService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        parser: TransactionParser,
        store: Arc<PoolStore>,
        yields: Arc<YieldClient>,
        tokens: Arc<TokenClient>,
    ) -> Self {
        Self {
            parser,
            store,
            yields,
            tokens,
        }
    }

    /// Processes every item of a webhook payload, in order.
    pub async fn process_payload(&self, items: Vec<serde_json::Value>) -> IngestReport {
        let mut report = IngestReport {
            received: items.len(),
            ..IngestReport::default()
        };
        for item in items {
            let outcome = self.process_item(item).await;
            report.record(&outcome);
        }
        tracing::info!(
            received = report.received,
            created = report.created,
            duplicates = report.duplicates,
            rejected = report.rejected,
            ignored = report.ignored_type,
            failed = report.failed,
            "webhook payload processed"
        );
        report
    }

    async fn process_item(&self, item: serde_json::Value) -> ItemOutcome {
        let tx = match TransactionParser::decode(item) {
            Ok(tx) => tx,
            Err(e) => {
                tracing::warn!(error = %e, "skipping undecodable webhook item");
                return ItemOutcome::Rejected;
            }
        };
        let signature = tx.signature.as_deref().unwrap_or_default();

        if !tx.has_accepted_type() {
            tracing::debug!(signature, tx_type = ?tx.tx_type, "ignoring transaction type");
            return ItemOutcome::IgnoredType;
        }

        let candidate = match self.parser.parse(&tx) {
            Ok(candidate) => candidate,
            Err(e) => {
                log_rejection(signature, &e);
                return ItemOutcome::Rejected;
            }
        };

        match self.ingest_candidate(&tx, candidate).await {
            Ok(Some(_)) => ItemOutcome::Created,
            Ok(None) => ItemOutcome::Duplicate,
            Err(e) => {
                tracing::error!(signature, error = %e, "failed to store pool");
                ItemOutcome::Failed
            }
        }
    }

    async fn ingest_candidate(
        &self,
        tx: &TransactionNotification,
        candidate: PoolCandidate,
    ) -> Result<Option<PoolRecord>, IndexerError> {
        if self.store.pool_exists(&candidate.pool_address).await? {
            tracing::info!(
                pool_address = %candidate.pool_address,
                signature = %candidate.signature,
                "pool already stored, skipping"
            );
            return Ok(None);
        }

        let enrichment = self.enrich(&candidate).await;
        let raw_data = enrichment.raw_data(&candidate);
        let new_pool = NewPool {
            candidate,
            enrichment: enrichment.figures(),
        };

        let Some(pool) = self.store.insert_pool(new_pool).await? else {
            tracing::info!("pool inserted concurrently, skipping");
            return Ok(None);
        };

        let event = NewPoolEvent {
            pool_id: pool.id,
            kind: PoolEventKind::Created,
            amount: tx.first_transfer_amount(&pool.token_a),
            signature: pool.signature.clone(),
            raw_data,
            timestamp: pool.timestamp,
        };
        if self.store.insert_event(event).await?.is_none() {
            tracing::warn!(signature = %pool.signature, "creation event already recorded");
        }

        tracing::info!(
            pool_id = %pool.id,
            pool_address = %pool.pool_address,
            token_a = %pool.token_a,
            token_b = %pool.token_b,
            apy = ?pool.enrichment.apy,
            address_is_fallback = pool.address_is_fallback,
            "pool created"
        );
        Ok(Some(pool))
    }

    /// Yield listing (token A first, then token B) and both token snapshots.
    async fn enrich(&self, candidate: &PoolCandidate) -> EnrichmentResult {
        let yield_pool = match self.lookup_yield(&candidate.token_a).await {
            Some(found) => Some(found),
            None => self.lookup_yield(&candidate.token_b).await,
        };
        EnrichmentResult {
            yield_pool,
            token_a: self.lookup_token(&candidate.token_a).await,
            token_b: self.lookup_token(&candidate.token_b).await,
        }
    }

    async fn lookup_yield(&self, mint: &str) -> Option<YieldPool> {
        match self.yields.search_by_mint(mint).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(mint, kind = e.kind(), error = %e, "yield lookup failed");
                None
            }
        }
    }

    async fn lookup_token(&self, mint: &str) -> Option<TokenInfo> {
        match self.tokens.token_snapshot(mint).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(mint, kind = e.kind(), error = %e, "token lookup failed");
                None
            }
        }
    }

    /// Fetches fresh yield figures for one stored pool.
    ///
    /// Returns the pool unchanged when no listing matches either token.
    ///
    /// # Errors
    ///
    /// Returns [`IndexerError::PoolNotFound`] for an unknown address,
    /// [`IndexerError::Upstream`] if the yield API keeps failing, or a
    /// persistence error.
    pub async fn refresh_enrichment(&self, pool_address: &str) -> Result<PoolRecord, IndexerError> {
        let pool = self
            .store
            .find_pool(pool_address)
            .await?
            .ok_or_else(|| IndexerError::PoolNotFound(pool_address.to_string()))?;

        let found = match self.yields.search_by_mint(&pool.token_a).await? {
            Some(found) => Some(found),
            None => self.yields.search_by_mint(&pool.token_b).await?,
        };
        match found {
            Some(listing) => self.apply_refresh(&pool, &listing).await,
            None => Ok(pool),
        }
    }

    /// Refreshes up to `limit` pools that still have no APY, oldest first.
    ///
    /// The yield listing is downloaded once per pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate pools cannot be read or the
    /// listing cannot be fetched. Per-pool failures are counted instead.
    pub async fn refresh_missing_apy(&self, limit: u32) -> Result<RefreshReport, IndexerError> {
        let pools = self.store.pools_missing_apy(limit).await?;
        let mut report = RefreshReport {
            checked: pools.len(),
            ..RefreshReport::default()
        };
        if pools.is_empty() {
            return Ok(report);
        }

        let listing = self.yields.list_pools().await?;
        for pool in &pools {
            let Some(found) = listing
                .iter()
                .find(|p| p.matches_mint(&pool.token_a))
                .or_else(|| listing.iter().find(|p| p.matches_mint(&pool.token_b)))
            else {
                // rotate to the back so later passes reach newer pools
                if let Err(e) = self.store.touch_pool(pool.id).await {
                    tracing::warn!(
                        pool_address = %pool.pool_address,
                        error = %e,
                        "failed to requeue pool"
                    );
                    report.failed += 1;
                }
                continue;
            };
            match self.apply_refresh(pool, found).await {
                Ok(updated) if updated.enrichment.apy.is_some() => report.updated += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(pool_address = %pool.pool_address, error = %e, "refresh failed");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            checked = report.checked,
            updated = report.updated,
            failed = report.failed,
            "apy refresh pass finished"
        );
        Ok(report)
    }

    async fn apply_refresh(
        &self,
        pool: &PoolRecord,
        listing: &YieldPool,
    ) -> Result<PoolRecord, IndexerError> {
        let updated = self
            .store
            .update_enrichment(pool.id, listing.enrichment())
            .await?
            .ok_or_else(|| IndexerError::PoolNotFound(pool.pool_address.clone()))?;

        let now = Utc::now();
        let event = NewPoolEvent {
            pool_id: pool.id,
            kind: PoolEventKind::EnrichmentRefreshed,
            amount: None,
            signature: format!(
                "refresh:{}:{}:{}",
                pool.pool_address,
                now.timestamp_millis(),
                Uuid::new_v4().simple()
            ),
            raw_data: serde_json::json!({ "yieldPool": listing }),
            timestamp: now,
        };
        if self.store.insert_event(event).await?.is_none() {
            tracing::warn!(
                pool_address = %pool.pool_address,
                "refresh event signature already stored"
            );
        }

        tracing::info!(
            pool_address = %updated.pool_address,
            apy = ?updated.enrichment.apy,
            "pool enrichment refreshed"
        );
        Ok(updated)
    }
}

fn log_rejection(signature: &str, error: &ParseError) {
    if error.is_malformed() {
        tracing::warn!(signature, error = %error, "malformed transaction");
    } else {
        tracing::debug!(signature, error = %error, "no pool in transaction");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::parser::known_accounts::NATIVE_MINT;
    use crate::persistence::MemoryPoolStore;
    use crate::test_support::{MockApis, build_service, unreachable_base_url};

    fn create_pool_item(signature: &str, pool: &str) -> serde_json::Value {
        json!({
            "type": "CREATE_POOL",
            "source": "RAYDIUM",
            "signature": signature,
            "timestamp": 1_700_000_000,
            "feePayer": "feePayer",
            "tokenTransfers": [
                { "mint": "MintAlpha", "tokenAmount": 1000.0 },
                { "mint": NATIVE_MINT, "tokenAmount": 5.0 },
                { "mint": "MintBeta", "tokenAmount": 250.0 }
            ],
            "accounts": ["feePayer", pool, "MintAlpha", "MintBeta"]
        })
    }

    fn listing_for(mint: &str, apy: f64) -> serde_json::Value {
        json!({
            "pool": format!("llama-{mint}"),
            "chain": "Solana",
            "project": "raydium-amm",
            "symbol": "ALPHA-BETA",
            "tvlUsd": 2_500_000.0,
            "apy": apy,
            "volumeUsd1d": 40_000.0,
            "underlyingTokens": [mint]
        })
    }

    #[tokio::test]
    async fn stores_enriched_pool_and_creation_event() {
        let apis = MockApis::start(
            vec![listing_for("MintBeta", 18.5)],
            vec![json!({ "id": "MintAlpha", "symbol": "ALPHA", "name": "Alpha", "usdPrice": 0.5 })],
        )
        .await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));

        let report = service
            .process_payload(vec![create_pool_item("sig1", "PoolAcct")])
            .await;
        assert_eq!(report.created, 1);

        let Ok(Some(pool)) = store.find_pool("PoolAcct").await else {
            panic!("pool stored");
        };
        assert_eq!(pool.token_a, "MintAlpha");
        assert_eq!(pool.token_b, "MintBeta");
        assert_eq!(pool.source, "RAYDIUM");
        // token A has no listing, token B does
        assert_eq!(pool.enrichment.apy, Some(18.5));
        assert_eq!(pool.enrichment.tvl, Some(2_500_000.0));

        let Ok(events) = store.pool_events(pool.id, 10).await else {
            panic!("events readable");
        };
        let Some(event) = events.first() else {
            panic!("creation event stored");
        };
        assert_eq!(event.event_type, PoolEventKind::Created);
        assert_eq!(event.signature, "sig1");
        assert_eq!(event.amount, Some(1000.0));
        assert_eq!(event.raw_data["tokenA"]["symbol"], "ALPHA");
        assert!(event.raw_data["tokenB"].is_null());
    }

    #[tokio::test]
    async fn same_payload_twice_stores_one_pool() {
        let apis = MockApis::start(vec![], vec![]).await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));
        let payload = vec![create_pool_item("sig1", "PoolAcct")];

        let first = service.process_payload(payload.clone()).await;
        let second = service.process_payload(payload).await;

        assert_eq!(first.created, 1);
        assert_eq!(second.created, 0);
        assert_eq!(second.duplicates, 1);
        let Ok(pools) = store.recent_pools(50).await else {
            panic!("pools readable");
        };
        assert_eq!(pools.len(), 1);
    }

    #[tokio::test]
    async fn enrichment_failure_does_not_block_persistence() {
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let unreachable = unreachable_base_url();
        let service = build_service(&unreachable, &unreachable, Arc::clone(&store));

        let report = service
            .process_payload(vec![create_pool_item("sig1", "PoolAcct")])
            .await;
        assert_eq!(report.created, 1);

        let Ok(Some(pool)) = store.find_pool("PoolAcct").await else {
            panic!("pool stored");
        };
        assert!(pool.enrichment.is_empty());
    }

    #[tokio::test]
    async fn bad_items_do_not_abort_the_batch() {
        let apis = MockApis::start(vec![], vec![]).await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));

        let mut swap = create_pool_item("sig-swap", "OtherPool");
        swap["type"] = json!("SWAP");
        let mut one_mint = create_pool_item("sig-one", "OnePool");
        one_mint["tokenTransfers"] = json!([{ "mint": "MintAlpha" }, { "mint": NATIVE_MINT }]);

        let report = service
            .process_payload(vec![
                json!(42),
                swap,
                one_mint,
                create_pool_item("sig1", "PoolAcct"),
            ])
            .await;

        assert_eq!(
            report,
            IngestReport {
                received: 4,
                ignored_type: 1,
                rejected: 2,
                duplicates: 0,
                created: 1,
                failed: 0,
            }
        );
    }

    #[tokio::test]
    async fn fallback_address_is_flagged_and_deduplicated() {
        let apis = MockApis::start(vec![], vec![]).await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));

        let mut item = create_pool_item("sig-fallback", "ignored");
        item["accounts"] = json!(["feePayer", "MintAlpha", "MintBeta"]);
        let report = service.process_payload(vec![item.clone(), item]).await;
        assert_eq!(report.created, 1);
        assert_eq!(report.duplicates, 1);

        let Ok(Some(pool)) = store.find_pool("sig-fallback").await else {
            panic!("pool stored under its signature");
        };
        assert!(pool.address_is_fallback);
    }

    #[tokio::test]
    async fn refresh_enrichment_updates_apy_and_appends_event() {
        let apis = MockApis::start(vec![], vec![]).await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));
        let _ = service
            .process_payload(vec![create_pool_item("sig1", "PoolAcct")])
            .await;

        apis.set_listing(vec![listing_for("MintAlpha", 9.0)]).await;
        let Ok(updated) = service.refresh_enrichment("PoolAcct").await else {
            panic!("refresh succeeds");
        };
        assert_eq!(updated.enrichment.apy, Some(9.0));

        let Ok(events) = store.pool_events(updated.id, 10).await else {
            panic!("events readable");
        };
        assert_eq!(events.len(), 2);
        assert_eq!(
            events.first().map(|e| e.event_type),
            Some(PoolEventKind::EnrichmentRefreshed)
        );

        // back-to-back refreshes within one millisecond still get their own event
        let (Ok(_), Ok(_)) = (
            service.refresh_enrichment("PoolAcct").await,
            service.refresh_enrichment("PoolAcct").await,
        ) else {
            panic!("repeated refreshes succeed");
        };
        let Ok(events) = store.pool_events(updated.id, 10).await else {
            panic!("events readable");
        };
        assert_eq!(events.len(), 4);

        let missing = service.refresh_enrichment("NoSuchPool").await;
        assert!(matches!(missing, Err(IndexerError::PoolNotFound(_))));
    }

    #[tokio::test]
    async fn refresh_missing_apy_fills_known_listings() {
        let apis = MockApis::start(vec![], vec![]).await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));
        let _ = service
            .process_payload(vec![
                create_pool_item("sig1", "PoolOne"),
                create_pool_item("sig2", "PoolTwo"),
            ])
            .await;

        apis.set_listing(vec![listing_for("MintBeta", 3.0)]).await;
        let Ok(report) = service.refresh_missing_apy(10).await else {
            panic!("refresh pass succeeds");
        };
        assert_eq!(report.checked, 2);
        assert_eq!(report.updated, 2);
        let Ok(missing) = store.pools_missing_apy(10).await else {
            panic!("pools readable");
        };
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn unlisted_pools_do_not_starve_the_refresh_queue() {
        let apis = MockApis::start(vec![], vec![]).await;
        let store = Arc::new(PoolStore::Memory(MemoryPoolStore::new()));
        let service = build_service(&apis.base_url, &apis.base_url, Arc::clone(&store));

        let mut listed = create_pool_item("sig3", "PoolListed");
        listed["tokenTransfers"] = json!([
            { "mint": "MintGamma", "tokenAmount": 10.0 },
            { "mint": "MintDelta", "tokenAmount": 20.0 }
        ]);
        listed["accounts"] = json!(["feePayer", "PoolListed", "MintGamma", "MintDelta"]);
        let report = service
            .process_payload(vec![
                create_pool_item("sig1", "PoolOld1"),
                create_pool_item("sig2", "PoolOld2"),
                listed,
            ])
            .await;
        assert_eq!(report.created, 3);

        apis.set_listing(vec![listing_for("MintGamma", 7.5)]).await;
        let mut updated = 0;
        for _ in 0..2 {
            let Ok(report) = service.refresh_missing_apy(2).await else {
                panic!("refresh pass succeeds");
            };
            assert_eq!(report.checked, 2);
            updated += report.updated;
        }
        assert_eq!(updated, 1);

        let Ok(Some(pool)) = store.find_pool("PoolListed").await else {
            panic!("pool stored");
        };
        assert_eq!(pool.enrichment.apy, Some(7.5));
    }

    #[tokio::test]
    async fn persistence_failure_counts_every_item_as_failed() {
        use std::time::Duration;

        use sqlx::postgres::PgPoolOptions;

        use crate::persistence::PostgresPoolStore;

        let Ok(pool) = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://postgres@127.0.0.1:1/pool_indexer")
        else {
            panic!("lazy pool builds without connecting");
        };
        let store = Arc::new(PoolStore::Postgres(PostgresPoolStore::new(pool)));
        let unreachable = unreachable_base_url();
        let service = build_service(&unreachable, &unreachable, store);

        let report = service
            .process_payload(vec![
                create_pool_item("sig1", "PoolOne"),
                create_pool_item("sig2", "PoolTwo"),
            ])
            .await;

        assert_eq!(report.received, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.created, 0);
    }
}

//! DefiLlama yields API client.
//!
//! The API has no server-side filter by mint: [`YieldClient::search_by_mint`]
//! downloads the full listing and matches client-side.

use serde::{Deserialize, Serialize};

use super::http::ApiClient;
use super::{ClientConfig, ClientError};
use crate::domain::Enrichment;

/// Chain label used by DefiLlama for Solana listings.
const SOLANA_CHAIN: &str = "solana";

#[derive(Debug, Deserialize)]
struct PoolsResponse {
    #[serde(default)]
    data: Vec<YieldPool>,
}

/// One entry of the `/pools` listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldPool {
    /// DefiLlama pool id.
    #[serde(default)]
    pub pool: String,
    /// Chain name (e.g. `"Solana"`).
    #[serde(default)]
    pub chain: String,
    /// Protocol slug (e.g. `"raydium-amm"`).
    #[serde(default)]
    pub project: String,
    /// Pair symbol (e.g. `"SOL-USDC"`).
    #[serde(default)]
    pub symbol: String,
    /// Total value locked in USD.
    #[serde(default)]
    pub tvl_usd: Option<f64>,
    /// Total APY in percent.
    #[serde(default)]
    pub apy: Option<f64>,
    /// Fee-derived APY.
    #[serde(default)]
    pub apy_base: Option<f64>,
    /// Incentive APY.
    #[serde(default)]
    pub apy_reward: Option<f64>,
    /// Trailing 24h volume in USD.
    #[serde(default)]
    pub volume_usd1d: Option<f64>,
    /// Mints of the pool's tokens.
    #[serde(default)]
    pub underlying_tokens: Option<Vec<String>>,
}

impl YieldPool {
    /// Heuristic match of a listing against a token mint.
    ///
    /// Solana listings only. Matches when the mint is one of the underlying
    /// tokens or appears as a substring of the symbol or pool id.
    #[must_use]
    pub fn matches_mint(&self, mint: &str) -> bool {
        if mint.is_empty() || !self.chain.eq_ignore_ascii_case(SOLANA_CHAIN) {
            return false;
        }
        self.underlying_tokens
            .as_deref()
            .is_some_and(|tokens| tokens.iter().any(|t| t == mint))
            || self.symbol.contains(mint)
            || self.pool.contains(mint)
    }

    /// Yield figures carried by the listing.
    #[must_use]
    pub const fn enrichment(&self) -> Enrichment {
        Enrichment {
            apy: self.apy,
            tvl: self.tvl_usd,
            volume_24h: self.volume_usd1d,
        }
    }
}

/// Client for `yields.llama.fi`.
#[derive(Debug)]
pub struct YieldClient {
    api: ApiClient,
}

impl YieldClient {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    /// Fetches the full pool listing. A `404` yields an empty listing.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] once retries are exhausted.
    pub async fn list_pools(&self) -> Result<Vec<YieldPool>, ClientError> {
        let response: Option<PoolsResponse> = self.api.get_json("/pools", &[]).await?;
        Ok(response.map(|r| r.data).unwrap_or_default())
    }

    /// First Solana listing that matches `mint`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] once retries are exhausted.
    pub async fn search_by_mint(&self, mint: &str) -> Result<Option<YieldPool>, ClientError> {
        let pools = self.list_pools().await?;
        let found = pools.into_iter().find(|p| p.matches_mint(mint));
        tracing::debug!(mint, found = found.is_some(), "yield lookup");
        Ok(found)
    }
}

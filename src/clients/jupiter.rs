//! Jupiter token and price API client.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::http::ApiClient;
use super::{ClientConfig, ClientError};

/// Token metadata from `/tokens/v2/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Mint address.
    pub id: String,
    /// Token name.
    #[serde(default)]
    pub name: String,
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Decimal places.
    #[serde(default)]
    pub decimals: Option<u8>,
    /// Spot price in USD.
    #[serde(default)]
    pub usd_price: Option<f64>,
    /// Liquidity in USD across indexed venues.
    #[serde(default)]
    pub liquidity: Option<f64>,
    /// Logo URL.
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceEntry {
    usd_price: Option<f64>,
}

/// Client for the Jupiter lite API.
#[derive(Debug)]
pub struct TokenClient {
    api: ApiClient,
}

impl TokenClient {
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

    /// Metadata of `mint`, or `None` if Jupiter does not index it.
    ///
    /// The search endpoint does fuzzy matching; only an entry whose id is
    /// exactly `mint` is accepted.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] once retries are exhausted.
    pub async fn token_info(&self, mint: &str) -> Result<Option<TokenInfo>, ClientError> {
        let tokens: Option<Vec<TokenInfo>> = self
            .api
            .get_json("/tokens/v2/search", &[("query", mint)])
            .await?;
        Ok(tokens
            .unwrap_or_default()
            .into_iter()
            .find(|t| t.id == mint))
    }

    /// USD price of `mint`, or `None` if Jupiter has no price for it.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] once retries are exhausted.
    pub async fn token_price(&self, mint: &str) -> Result<Option<f64>, ClientError> {
        let prices: Option<HashMap<String, Option<PriceEntry>>> =
            self.api.get_json("/price/v3", &[("ids", mint)]).await?;
        Ok(prices
            .and_then(|mut p| p.remove(mint))
            .flatten()
            .and_then(|entry| entry.usd_price))
    }

    /// Metadata of `mint` with the price filled in from the price API when
    /// the token listing has none. A failed price lookup leaves the price
    /// empty and keeps the metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] once retries of the metadata lookup are
    /// exhausted.
    pub async fn token_snapshot(&self, mint: &str) -> Result<Option<TokenInfo>, ClientError> {
        let Some(mut info) = self.token_info(mint).await? else {
            return Ok(None);
        };
        if info.usd_price.is_none() {
            info.usd_price = match self.token_price(mint).await {
                Ok(price) => price,
                Err(e) => {
                    tracing::warn!(mint, kind = e.kind(), error = %e, "price lookup failed");
                    None
                }
            };
        }
        Ok(Some(info))
    }
}

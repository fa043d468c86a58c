//! Throttled, retrying JSON GET shared by the external API clients.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::rate_limiter::RateLimiter;
use super::retry::with_backoff;
use super::{ClientConfig, ClientError};

/// HTTP client bound to one external API.
///
/// Owns that API's [`RateLimiter`]: every attempt, retries included,
/// waits for a permit before the request goes out.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    limiter: RateLimiter,
}

impl ApiClient {
    /// Builds a client from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pool-indexer/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let limiter = RateLimiter::new(config.rate_limit_delay);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    /// Base URL all paths are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GETs `path` with the URL-encoded `query` pairs and decodes the JSON
    /// body.
    ///
    /// `404 Not Found` yields `Ok(None)` straight away. Any other non-2xx
    /// status, transport error or undecodable body is retried according
    /// to the configured policy.
    ///
    /// # Errors
    ///
    /// Returns the [`ClientError`] of the last attempt.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ClientError> {
        let url = format!("{}{}", self.config.base_url, path);
        with_backoff(&self.config.retry, || self.fetch(&url, query)).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, ClientError> {
        self.limiter.wait().await;
        tracing::debug!(url, ?query, "outbound request");

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        response.json::<T>().await.map(Some).map_err(|e| {
            if e.is_decode() {
                ClientError::Decode(e.to_string())
            } else {
                ClientError::Http(e)
            }
        })
    }
}

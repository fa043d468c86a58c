//! Outbound clients for the enrichment APIs.
//!
//! Each external dependency gets its own client with its own
//! [`RateLimiter`] and [`RetryPolicy`], configured through
//! [`ClientConfig`].

pub mod defillama;
pub mod http;
pub mod jupiter;
pub mod rate_limiter;
pub mod retry;

use std::time::Duration;

use reqwest::StatusCode;

pub use defillama::{YieldClient, YieldPool};
pub use jupiter::{TokenClient, TokenInfo};
pub use rate_limiter::RateLimiter;
pub use retry::{RetryPolicy, with_backoff};

/// Settings of one outbound client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry behaviour.
    pub retry: RetryPolicy,
    /// Minimum spacing between requests.
    pub rate_limit_delay: Duration,
}

/// Failure of an outbound call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS, ...).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status other than `404`.
    #[error("unexpected status {0}")]
    Status(StatusCode),

    /// Response body did not match the expected shape.
    #[error("undecodable response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Short label for logs and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(e) if e.is_timeout() => "timeout",
            Self::Http(e) if e.is_connect() => "connect",
            Self::Http(_) => "request",
            Self::Status(s) if s.is_server_error() => "status_5xx",
            Self::Status(_) => "status_4xx",
            Self::Decode(_) => "decode",
        }
    }
}

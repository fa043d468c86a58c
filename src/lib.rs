//! # pool-indexer
//!
//! Helius webhook ingestion service that detects Solana liquidity pool
//! creations, enriches them with DefiLlama yield data and Jupiter token
//! data, stores them in PostgreSQL, and serves them over a small REST API.
//!
//! ## Architecture
//!
//! ```text
//! Helius webhook            REST clients
//!     │                          │
//!     ├── Webhook Handler (api/) ├── Pool Handlers (api/)
//!     │                          │
//!     ├── IngestionService       ├── QueryService   (service/)
//!     │     ├── TransactionParser (parser/)
//!     │     ├── YieldClient, TokenClient (clients/)
//!     │     │     └── RateLimiter + retry with backoff
//!     │                          │
//!     └──────── PoolStore (persistence/) ─────┘
//!                 ├── PostgreSQL
//!                 └── in-memory
//! ```

pub mod api;
pub mod app_state;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod parser;
pub mod persistence;
pub mod service;

#[cfg(test)]
#[allow(clippy::panic)]
mod test_support;

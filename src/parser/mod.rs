//! Transaction parsing: from webhook item to pool candidate.
//!
//! [`TransactionParser`] applies the pair heuristic; the pool account is
//! chosen by a pluggable [`PoolAddressStrategy`].

pub mod known_accounts;
pub mod pool_address;
pub mod transaction_parser;

pub use pool_address::{AccountEliminationStrategy, ExcludedAccounts, PoolAddressStrategy};
pub use transaction_parser::TransactionParser;

/// Why a transaction did not yield a pool candidate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The item could not be decoded as a transaction.
    #[error("malformed transaction: {0}")]
    Malformed(String),

    /// `tokenTransfers` is absent.
    #[error("transaction has no token transfers")]
    MissingTransfers,

    /// Fewer than two transfers.
    #[error("transaction has {0} token transfer(s), need at least 2")]
    TooFewTransfers(usize),

    /// Fewer than two distinct non-native mints among the transfers.
    #[error("transaction has {0} distinct non-native mint(s), need at least 2")]
    TooFewDistinctMints(usize),

    /// Signature absent or empty.
    #[error("transaction has no signature")]
    MissingSignature,

    /// Timestamp outside the representable range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

impl ParseError {
    /// Returns `true` for payload errors, `false` when the transaction was
    /// readable but does not describe a pair.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_) | Self::MissingSignature | Self::InvalidTimestamp(_)
        )
    }
}

//! Pool candidate extraction from a webhook transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::ParseError;
use super::known_accounts::NATIVE_MINT;
use super::pool_address::{AccountEliminationStrategy, ExcludedAccounts, PoolAddressStrategy};
use crate::domain::pool_candidate::UNKNOWN_SOURCE;
use crate::domain::{PoolCandidate, TokenTransfer, TransactionNotification};

/// Turns a [`TransactionNotification`] into a [`PoolCandidate`].
///
/// Pure apart from the fallback to the current time when the notification
/// has no timestamp. The pool address guess is delegated to a
/// [`PoolAddressStrategy`].
#[derive(Debug, Clone)]
pub struct TransactionParser {
    strategy: Arc<dyn PoolAddressStrategy>,
}

impl TransactionParser {
    /// Creates a parser using [`AccountEliminationStrategy`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_strategy(Arc::new(AccountEliminationStrategy))
    }

    /// Creates a parser with a custom pool address strategy.
    #[must_use]
    pub fn with_strategy(strategy: Arc<dyn PoolAddressStrategy>) -> Self {
        Self { strategy }
    }

    /// Decodes one raw webhook item.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Malformed`] if the item is not a transaction
    /// object.
    pub fn decode(value: serde_json::Value) -> Result<TransactionNotification, ParseError> {
        serde_json::from_value(value).map_err(|e| ParseError::Malformed(e.to_string()))
    }

    /// Extracts the pool candidate of a transaction.
    ///
    /// `token_a`/`token_b` are the first two distinct non-native mints in
    /// transfer order. If the strategy finds no pool account the signature
    /// is used and the candidate is flagged with `address_is_fallback`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing why the transaction does not
    /// describe a pair.
    pub fn parse(&self, tx: &TransactionNotification) -> Result<PoolCandidate, ParseError> {
        let transfers = tx
            .token_transfers
            .as_deref()
            .ok_or(ParseError::MissingTransfers)?;
        if transfers.len() < 2 {
            return Err(ParseError::TooFewTransfers(transfers.len()));
        }

        let mints = distinct_mints(transfers);
        let (Some(&token_a), Some(&token_b)) = (mints.first(), mints.get(1)) else {
            return Err(ParseError::TooFewDistinctMints(mints.len()));
        };

        let signature = tx
            .signature
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ParseError::MissingSignature)?;

        let timestamp = match tx.timestamp {
            Some(secs) => {
                DateTime::<Utc>::from_timestamp(secs, 0).ok_or(ParseError::InvalidTimestamp(secs))?
            }
            None => Utc::now(),
        };

        let excluded = ExcludedAccounts::new(tx.fee_payer.as_deref(), token_a, token_b);
        let derived = self.strategy.derive_pool_address(tx, &excluded);
        let address_is_fallback = derived.is_none();
        let pool_address = derived.unwrap_or_else(|| signature.to_string());

        Ok(PoolCandidate {
            token_a: token_a.to_string(),
            token_b: token_b.to_string(),
            pool_address,
            address_is_fallback,
            signature: signature.to_string(),
            timestamp,
            source: tx
                .source
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        })
    }
}

impl Default for TransactionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-native mints in first-encounter order, without duplicates.
fn distinct_mints(transfers: &[TokenTransfer]) -> Vec<&str> {
    let mut mints: Vec<&str> = Vec::with_capacity(2);
    for mint in transfers.iter().map(|t| t.mint.as_str()) {
        if mint.is_empty() || mint == NATIVE_MINT || mints.contains(&mint) {
            continue;
        }
        mints.push(mint);
    }
    mints
}

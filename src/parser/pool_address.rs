//! Pool address derivation strategies.
//!
//! Webhook payloads do not say which account is the pool. The
//! [`PoolAddressStrategy`] trait isolates that guess so that a stronger
//! detector (e.g. one that decodes the AMM's initialize instruction) can
//! replace the default without touching the rest of the pipeline.

use std::fmt;

use super::known_accounts;
use crate::domain::TransactionNotification;

/// Accounts a strategy must never return as the pool.
///
/// Always covers the native mint and the infrastructure programs in
/// [`known_accounts::INFRA_PROGRAM_IDS`]; per transaction it adds the
/// fee payer and both pair mints.
#[derive(Debug, Clone, Copy)]
pub struct ExcludedAccounts<'a> {
    fee_payer: Option<&'a str>,
    mints: [&'a str; 2],
}

impl<'a> ExcludedAccounts<'a> {
    /// Builds the exclusion set for one transaction.
    #[must_use]
    pub const fn new(fee_payer: Option<&'a str>, token_a: &'a str, token_b: &'a str) -> Self {
        Self {
            fee_payer,
            mints: [token_a, token_b],
        }
    }

    /// Returns `true` if `account` may not be used as the pool address.
    #[must_use]
    pub fn contains(&self, account: &str) -> bool {
        self.fee_payer == Some(account)
            || self.mints.contains(&account)
            || known_accounts::is_well_known(account)
    }
}

/// Picks the pool account of a transaction that created a pair.
pub trait PoolAddressStrategy: Send + Sync + fmt::Debug {
    /// Returns the pool account, or `None` if no account qualifies.
    fn derive_pool_address(
        &self,
        tx: &TransactionNotification,
        excluded: &ExcludedAccounts<'_>,
    ) -> Option<String>;
}

/// Process of elimination over the account list.
///
/// Returns the first account, in transaction order, that is not excluded.
/// Cheap and often right for single-instruction pool creations; wrong
/// whenever the transaction touches other accounts (LP mint, vaults,
/// user token accounts) before the pool state account.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountEliminationStrategy;

impl PoolAddressStrategy for AccountEliminationStrategy {
    fn derive_pool_address(
        &self,
        tx: &TransactionNotification,
        excluded: &ExcludedAccounts<'_>,
    ) -> Option<String> {
        tx.account_keys()
            .find(|account| !account.is_empty() && !excluded.contains(account))
            .map(ToString::to_string)
    }
}

//! Helius enhanced-transaction webhook payload.
//!
//! Only the fields the pool detector looks at are modelled. Every field is
//! optional on the wire: deliveries are informally typed and a missing field
//! must reject one item, not the whole batch.

use serde::Deserialize;

/// Transaction types that may carry a pool creation.
pub const ACCEPTED_TRANSACTION_TYPES: [&str; 2] = ["ENHANCED_TRANSACTION", "CREATE_POOL"];

/// One transaction as delivered by the webhook provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNotification {
    /// Category tag (e.g. `"CREATE_POOL"`, `"SWAP"`).
    #[serde(rename = "type", default)]
    pub tx_type: Option<String>,
    /// Originating protocol name (e.g. `"RAYDIUM"`).
    #[serde(default)]
    pub source: Option<String>,
    /// Transaction signature.
    #[serde(default)]
    pub signature: Option<String>,
    /// Block time in seconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    /// SPL token transfers, in instruction order.
    #[serde(default)]
    pub token_transfers: Option<Vec<TokenTransfer>>,
    /// Flat list of account keys touched by the transaction.
    #[serde(default)]
    pub accounts: Option<Vec<String>>,
    /// Per-account balance changes; used as the account list when
    /// `accounts` is absent.
    #[serde(default)]
    pub account_data: Option<Vec<AccountData>>,
    /// Account that paid the transaction fee.
    #[serde(default)]
    pub fee_payer: Option<String>,
}

/// A single SPL token transfer inside a transaction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTransfer {
    /// Mint of the transferred token.
    #[serde(default)]
    pub mint: String,
    /// UI amount transferred.
    #[serde(default)]
    pub token_amount: Option<f64>,
    /// Sending wallet.
    #[serde(default)]
    pub from_user_account: Option<String>,
    /// Receiving wallet.
    #[serde(default)]
    pub to_user_account: Option<String>,
}

/// Account entry from the `accountData` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountData {
    /// Account key.
    #[serde(default)]
    pub account: String,
}

impl TransactionNotification {
    /// Returns `true` if the `type` tag is one the detector handles.
    #[must_use]
    pub fn has_accepted_type(&self) -> bool {
        self.tx_type
            .as_deref()
            .is_some_and(|t| ACCEPTED_TRANSACTION_TYPES.contains(&t))
    }

    /// Account keys in transaction order.
    ///
    /// Uses `accounts` when present, otherwise the `account` fields of
    /// `accountData`.
    pub fn account_keys(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match (&self.accounts, &self.account_data) {
            (Some(accounts), _) => Box::new(accounts.iter().map(String::as_str)),
            (None, Some(data)) => Box::new(data.iter().map(|d| d.account.as_str())),
            (None, None) => Box::new(std::iter::empty()),
        }
    }

    /// Amount of the first transfer of `mint`, if any.
    #[must_use]
    pub fn first_transfer_amount(&self, mint: &str) -> Option<f64> {
        self.token_transfers
            .as_deref()?
            .iter()
            .find(|t| t.mint == mint)
            .and_then(|t| t.token_amount)
    }
}

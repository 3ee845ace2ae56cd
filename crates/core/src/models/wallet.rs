//! Wallet balance and the client-side transaction log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Balance payload returned by the wallet endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(alias = "wallet", alias = "newBalance")]
    pub balance: Money,
}

/// What a wallet log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    /// A local debit for an order paid from the wallet.
    Payment,
    /// A local debit reverted after the order was rejected.
    Refund,
}

/// One entry of the client-only wallet log.
///
/// The log lives only for the session and is never reconciled with the
/// server's transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub balance_after: Money,
    pub at: DateTime<Utc>,
}

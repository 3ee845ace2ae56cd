//! Wallet holder.
//!
//! Mirrors the server balance. Deposits and withdrawals go through the API
//! and replace the local figure with the server's; order payments are local
//! debits only, re-synced after the order lands.

use std::sync::Arc;

use chrono::Utc;
use quickpick_api::{ApiError, Session};
use quickpick_core::{Money, MoneyError, TransactionKind, WalletBalance, WalletTransaction};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tracing::{info, instrument, warn};

/// Wallet errors.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientBalance { balance: Money, required: Money },

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl WalletError {
    /// Stable key for localizing the message.
    #[must_use]
    pub const fn message_key(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "wallet.insufficient_balance",
            Self::InvalidAmount(_) => "wallet.invalid_amount",
            Self::Api(_) => "wallet.request_failed",
        }
    }
}

#[derive(Serialize)]
struct AmountBody {
    amount: Money,
}

#[derive(Debug, Default)]
struct WalletState {
    generation: u64,
    balance: Money,
    transactions: Vec<WalletTransaction>,
}

impl WalletState {
    fn at(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    fn log(&mut self, kind: TransactionKind, amount: Money) {
        self.transactions.push(WalletTransaction {
            kind,
            amount,
            balance_after: self.balance,
            at: Utc::now(),
        });
    }
}

/// Wallet balance plus a session-only transaction log.
///
/// Cheaply cloneable; clones share state.
#[derive(Debug, Clone)]
pub struct Wallet {
    session: Session,
    state: Arc<RwLock<WalletState>>,
}

impl Wallet {
    /// A wallet with a zero balance. Call [`Wallet::refresh`] or
    /// [`Wallet::seed`] once signed in.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: Arc::new(RwLock::new(WalletState::default())),
        }
    }

    /// State for the current sign-in; anything left from before the session
    /// was last cleared is dropped first.
    async fn current(&self) -> RwLockWriteGuard<'_, WalletState> {
        let generation = self.session.generation();
        let mut state = self.state.write().await;
        if state.generation != generation {
            *state = WalletState::at(generation);
        }
        state
    }

    /// Current local balance.
    pub async fn balance(&self) -> Money {
        self.current().await.balance
    }

    /// Transactions recorded during this session, oldest first.
    pub async fn transactions(&self) -> Vec<WalletTransaction> {
        self.current().await.transactions.clone()
    }

    /// Set the balance from an already-fetched figure (e.g. the user payload).
    pub async fn seed(&self, balance: Money) {
        self.current().await.balance = balance;
    }

    /// Reset to zero and drop the log, on sign-out.
    pub async fn reset(&self) {
        *self.state.write().await = WalletState::at(self.session.generation());
    }

    /// Re-sync the balance from `GET /wallet/balance`.
    ///
    /// # Errors
    ///
    /// Returns the API error; the local balance is left unchanged.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Money, WalletError> {
        let WalletBalance { balance } = self.session.get("wallet/balance").await?;
        self.current().await.balance = balance;
        Ok(balance)
    }

    /// Deposit funds through `POST /wallet/add`.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts without a request; otherwise returns the
    /// API error.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn add_funds(&self, amount: Money) -> Result<Money, WalletError> {
        self.server_move("wallet/add", TransactionKind::Deposit, amount)
            .await
    }

    /// Withdraw funds through `POST /wallet/withdraw`.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts without a request; otherwise returns the
    /// API error (the server decides whether the balance suffices).
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn withdraw_funds(&self, amount: Money) -> Result<Money, WalletError> {
        self.server_move("wallet/withdraw", TransactionKind::Withdrawal, amount)
            .await
    }

    async fn server_move(
        &self,
        path: &str,
        kind: TransactionKind,
        amount: Money,
    ) -> Result<Money, WalletError> {
        let amount = amount.ensure_positive()?;
        let WalletBalance { balance } = self.session.post(path, &AmountBody { amount }).await?;

        let mut state = self.current().await;
        state.balance = balance;
        state.log(kind, amount);
        info!(?kind, %amount, %balance, "Wallet updated");
        Ok(balance)
    }

    /// Subtract `amount` locally for an order payment. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if the local balance is below `amount`,
    /// or `InvalidAmount` for non-positive amounts.
    pub async fn debit(&self, amount: Money) -> Result<Money, WalletError> {
        let amount = amount.ensure_positive()?;
        let mut state = self.current().await;
        let remaining =
            state
                .balance
                .checked_sub(amount)
                .ok_or(WalletError::InsufficientBalance {
                    balance: state.balance,
                    required: amount,
                })?;
        state.balance = remaining;
        state.log(TransactionKind::Payment, amount);
        Ok(remaining)
    }

    /// Revert a local debit after the order was rejected.
    pub async fn credit_back(&self, amount: Money) {
        let mut state = self.current().await;
        state.balance += amount;
        state.log(TransactionKind::Refund, amount);
        warn!(%amount, balance = %state.balance, "Reverted wallet debit");
    }
}

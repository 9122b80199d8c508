//! Value transfer between escrow accounts.
//!
//! Moving currency units is delegated to a [`ValueTransfer`] collaborator.
//! The ledger never mutates balances directly: it validates an operation,
//! hands the resulting [`Transfer`]s to a [`TransferBatch`], and commits
//! its own bookkeeping only once every transfer of the batch succeeded.
//!
//! [`InMemoryBank`] is the bundled collaborator used by the gateway binary
//! and the tests.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::{MortgageId, PartyId};

/// An account known to the value-transfer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Account {
    /// A free-standing party (lender, borrower, vendor).
    Party(PartyId),
    /// The shared lending pool. Its balance is the ledger's free balance.
    Pool,
    /// Transit account of one mortgage, used while funding it.
    Escrow(MortgageId),
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Party(id) => write!(f, "party:{id}"),
            Self::Pool => f.write_str("pool"),
            Self::Escrow(id) => write!(f, "escrow:{id}"),
        }
    }
}

/// A single movement of `amount` units from one account to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// Debited account.
    pub from: Account,
    /// Credited account.
    pub to: Account,
    /// Units moved.
    pub amount: u128,
}

impl Transfer {
    /// Creates a transfer of `amount` from `from` to `to`.
    #[must_use]
    pub const fn new(from: Account, to: Account, amount: u128) -> Self {
        Self { from, to, amount }
    }

    /// Returns the transfer that undoes this one.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            amount: self.amount,
        }
    }
}

/// Failure reported by a [`ValueTransfer`] collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The debited account does not hold enough units.
    #[error("{account} holds {available}, cannot send {requested}")]
    InsufficientBalance {
        /// Debited account.
        account: Account,
        /// Balance at the time of the transfer.
        available: u128,
        /// Units requested.
        requested: u128,
    },

    /// Crediting the account would overflow its balance.
    #[error("crediting {0} would overflow its balance")]
    Overflow(Account),

    /// The collaborator refused the transfer for a reason of its own.
    #[error("{account} rejected the transfer: {reason}")]
    Rejected {
        /// Account that refused.
        account: Account,
        /// Collaborator-provided reason.
        reason: String,
    },

    /// A failed batch could not be fully reversed.
    #[error("{cause}; {unreverted} transfer(s) could not be reversed")]
    RollbackIncomplete {
        /// The failure that triggered the rollback.
        cause: Box<TransferError>,
        /// Number of completed transfers left in place.
        unreverted: usize,
    },
}

/// External collaborator that moves currency units between accounts.
///
/// Implementations must apply each [`Transfer`] atomically: a transfer
/// that returns an error must not have changed any balance.
pub trait ValueTransfer: fmt::Debug + Send + Sync {
    /// Moves `transfer.amount` from `transfer.from` to `transfer.to`.
    ///
    /// # Errors
    ///
    /// Returns a [`TransferError`] if the transfer cannot be applied; no
    /// balance changes in that case.
    fn transfer(&self, transfer: &Transfer) -> Result<(), TransferError>;

    /// Returns the current balance of `account`.
    fn balance(&self, account: Account) -> u128;
}

/// Scoped all-or-nothing execution of several transfers.
///
/// Every transfer applied through [`TransferBatch::apply`] is recorded.
/// Unless [`TransferBatch::commit`] is called, the recorded transfers are
/// reversed in reverse order, either explicitly via
/// [`TransferBatch::rollback`] or when the batch is dropped.
#[derive(Debug)]
pub struct TransferBatch<'a> {
    bank: &'a dyn ValueTransfer,
    completed: Vec<Transfer>,
    committed: bool,
}

impl<'a> TransferBatch<'a> {
    /// Opens an empty batch against `bank`.
    #[must_use]
    pub fn new(bank: &'a dyn ValueTransfer) -> Self {
        Self {
            bank,
            completed: Vec::new(),
            committed: false,
        }
    }

    /// Applies every transfer in order, reversing all of them if any fails.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransferError`] encountered (wrapped in
    /// [`TransferError::RollbackIncomplete`] if the reversal itself failed).
    pub fn execute(
        bank: &'a dyn ValueTransfer,
        transfers: &[Transfer],
    ) -> Result<(), TransferError> {
        let mut batch = Self::new(bank);
        for transfer in transfers {
            if let Err(cause) = batch.apply(*transfer) {
                return Err(batch.rollback(cause));
            }
        }
        batch.commit();
        Ok(())
    }

    /// Applies one transfer and records it for a potential rollback.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's [`TransferError`]; the failed transfer
    /// is not recorded.
    pub fn apply(&mut self, transfer: Transfer) -> Result<(), TransferError> {
        self.bank.transfer(&transfer)?;
        self.completed.push(transfer);
        Ok(())
    }

    /// Keeps every applied transfer.
    pub fn commit(mut self) {
        self.committed = true;
    }

    /// Reverses every applied transfer and returns the error to report.
    #[must_use]
    pub fn rollback(mut self, cause: TransferError) -> TransferError {
        let unreverted = self.revert();
        if unreverted == 0 {
            cause
        } else {
            TransferError::RollbackIncomplete {
                cause: Box::new(cause),
                unreverted,
            }
        }
    }

    /// Reverses recorded transfers, newest first. Returns how many failed.
    fn revert(&mut self) -> usize {
        self.committed = true;
        let mut unreverted = 0;
        while let Some(transfer) = self.completed.pop() {
            if let Err(e) = self.bank.transfer(&transfer.reversed()) {
                tracing::error!(
                    from = %transfer.from,
                    to = %transfer.to,
                    amount = transfer.amount,
                    error = %e,
                    "failed to reverse transfer"
                );
                unreverted += 1;
            }
        }
        unreverted
    }
}

impl Drop for TransferBatch<'_> {
    fn drop(&mut self) {
        if !self.committed && !self.completed.is_empty() {
            tracing::warn!(
                transfers = self.completed.len(),
                "uncommitted transfer batch dropped, reversing"
            );
            let _ = self.revert();
        }
    }
}

#[derive(Debug, Default)]
struct BankState {
    balances: HashMap<Account, u128>,
    frozen: HashSet<Account>,
}

/// In-process [`ValueTransfer`] implementation keeping balances in memory.
///
/// Accounts start at zero. Units enter the system only through
/// [`InMemoryBank::credit`] (a faucet for test harnesses and local runs).
/// A frozen account refuses every transfer in or out of it.
#[derive(Debug, Default)]
pub struct InMemoryBank {
    state: Mutex<BankState>,
}

impl InMemoryBank {
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` newly issued units to `party`, returning the new
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Overflow`] if the balance would overflow.
    pub fn credit(&self, party: PartyId, amount: u128) -> Result<u128, TransferError> {
        let account = Account::Party(party);
        let mut state = self.lock();
        let balance = state.balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(account))?;
        Ok(*balance)
    }

    /// Freezes or unfreezes an account.
    pub fn set_frozen(&self, account: Account, frozen: bool) {
        let mut state = self.lock();
        if frozen {
            state.frozen.insert(account);
        } else {
            state.frozen.remove(&account);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BankState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ValueTransfer for InMemoryBank {
    fn transfer(&self, transfer: &Transfer) -> Result<(), TransferError> {
        let mut state = self.lock();

        for account in [transfer.from, transfer.to] {
            if state.frozen.contains(&account) {
                return Err(TransferError::Rejected {
                    account,
                    reason: "account is frozen".to_string(),
                });
            }
        }
        if transfer.amount == 0 || transfer.from == transfer.to {
            return Ok(());
        }

        let available = state.balances.get(&transfer.from).copied().unwrap_or(0);
        let debited = available
            .checked_sub(transfer.amount)
            .ok_or(TransferError::InsufficientBalance {
                account: transfer.from,
                available,
                requested: transfer.amount,
            })?;
        let credited = state
            .balances
            .get(&transfer.to)
            .copied()
            .unwrap_or(0)
            .checked_add(transfer.amount)
            .ok_or(TransferError::Overflow(transfer.to))?;

        state.balances.insert(transfer.from, debited);
        state.balances.insert(transfer.to, credited);
        Ok(())
    }

    fn balance(&self, account: Account) -> u128 {
        self.lock().balances.get(&account).copied().unwrap_or(0)
    }
}

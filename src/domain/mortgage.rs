//! Mortgage application and its funded-loan lifecycle.
//!
//! A [`Mortgage`] is created by the ledger in [`MortgageState::Applied`] and
//! only moves forward:
//!
//! ```text
//! Applied ──approve──▶ Approved ──deposit──▶ DepositReceived ──repay (full)──▶ Completed
//!    │                                            │   ▲
//!    └──reject──▶ Rejected                        └───┘ repay (partial)
//! ```
//!
//! The `check_*` methods validate an event without touching the mortgage;
//! the state-changing methods are crate-private and only called by the
//! ledger service after the matching check and every transfer succeeded.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::transfer::{Account, Transfer};
use super::{MortgageId, PartyId};
use crate::error::EscrowError;

/// Lifecycle state of a mortgage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MortgageState {
    /// Application submitted, awaiting the owner's decision.
    Applied,
    /// Approved by the owner, awaiting the borrower's deposit.
    Approved,
    /// Funded: vendor paid, loan principal being repaid.
    DepositReceived,
    /// Loan fully repaid.
    Completed,
    /// Declined by the owner.
    Rejected,
}

impl MortgageState {
    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Approved => "approved",
            Self::DepositReceived => "deposit_received",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Returns `true` for states that permit no further fund movement.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

impl fmt::Display for MortgageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MortgageState {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(Self::Applied),
            "approved" => Ok(Self::Approved),
            "deposit_received" => Ok(Self::DepositReceived),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(EscrowError::InvalidRequest(format!(
                "unknown mortgage state: {other}"
            ))),
        }
    }
}

/// Who may send repayments for a funded mortgage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentPolicy {
    /// Only the borrower may repay.
    #[default]
    BorrowerOnly,
    /// Any party may repay on the borrower's behalf.
    AnyParty,
}

impl RepaymentPolicy {
    /// Returns `true` if `caller` may repay a loan taken by `borrower`.
    #[must_use]
    pub fn permits(self, caller: PartyId, borrower: PartyId) -> bool {
        match self {
            Self::BorrowerOnly => caller == borrower,
            Self::AnyParty => true,
        }
    }

    /// Returns the policy as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BorrowerOnly => "borrower_only",
            Self::AnyParty => "any_party",
        }
    }
}

impl FromStr for RepaymentPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "borrower_only" | "borrower" => Ok(Self::BorrowerOnly),
            "any_party" | "any" => Ok(Self::AnyParty),
            other => Err(format!("unknown repayment policy: {other}")),
        }
    }
}

/// Terms fixed when a borrower applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MortgageTerms {
    borrower: PartyId,
    vendor: PartyId,
    deposit_amount: u128,
    loan_amount: u128,
    property_value: u128,
}

impl MortgageTerms {
    /// Validates and builds application terms.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidAmount`] if either amount is zero or
    /// their sum overflows.
    pub fn new(
        borrower: PartyId,
        vendor: PartyId,
        deposit_amount: u128,
        loan_amount: u128,
    ) -> Result<Self, EscrowError> {
        if deposit_amount == 0 {
            return Err(EscrowError::InvalidAmount(
                "deposit amount must be positive".to_string(),
            ));
        }
        if loan_amount == 0 {
            return Err(EscrowError::InvalidAmount(
                "loan amount must be positive".to_string(),
            ));
        }
        let property_value = deposit_amount.checked_add(loan_amount).ok_or_else(|| {
            EscrowError::InvalidAmount("deposit plus loan overflows".to_string())
        })?;
        Ok(Self {
            borrower,
            vendor,
            deposit_amount,
            loan_amount,
            property_value,
        })
    }
}

/// A single mortgage application and its repayment progress.
#[derive(Debug, Clone)]
pub struct Mortgage {
    id: MortgageId,
    terms: MortgageTerms,
    amount_repaid: u128,
    state: MortgageState,
    created_at: DateTime<Utc>,
    last_modified_at: DateTime<Utc>,
}

impl Mortgage {
    /// Creates a mortgage in [`MortgageState::Applied`].
    pub(crate) fn new(id: MortgageId, terms: MortgageTerms) -> Self {
        let now = Utc::now();
        Self {
            id,
            terms,
            amount_repaid: 0,
            state: MortgageState::Applied,
            created_at: now,
            last_modified_at: now,
        }
    }

    /// Mortgage identifier.
    #[must_use]
    pub const fn id(&self) -> MortgageId {
        self.id
    }

    /// Party that applied and owes the loan.
    #[must_use]
    pub const fn borrower(&self) -> PartyId {
        self.terms.borrower
    }

    /// Party paid the property value at funding time.
    #[must_use]
    pub const fn vendor(&self) -> PartyId {
        self.terms.vendor
    }

    /// Exact deposit the borrower must send.
    #[must_use]
    pub const fn deposit_amount(&self) -> u128 {
        self.terms.deposit_amount
    }

    /// Principal sourced from the pool.
    #[must_use]
    pub const fn loan_amount(&self) -> u128 {
        self.terms.loan_amount
    }

    /// `deposit_amount + loan_amount`.
    #[must_use]
    pub const fn property_value(&self) -> u128 {
        self.terms.property_value
    }

    /// Cumulative repayment received.
    #[must_use]
    pub const fn amount_repaid(&self) -> u128 {
        self.amount_repaid
    }

    /// Principal still owed. Zero before funding.
    #[must_use]
    pub const fn outstanding(&self) -> u128 {
        match self.state {
            MortgageState::DepositReceived | MortgageState::Completed => {
                self.terms.loan_amount.saturating_sub(self.amount_repaid)
            }
            _ => 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> MortgageState {
        self.state
    }

    /// Application timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last state change.
    #[must_use]
    pub const fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    fn ensure_state(
        &self,
        expected: MortgageState,
        operation: &'static str,
    ) -> Result<(), EscrowError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EscrowError::InvalidState {
                mortgage_id: self.id,
                state: self.state,
                operation,
            })
        }
    }

    /// Validates that the owner's decision can still be taken.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidState`] unless the mortgage is
    /// [`MortgageState::Applied`].
    pub fn check_decision(&self, operation: &'static str) -> Result<(), EscrowError> {
        self.ensure_state(MortgageState::Applied, operation)
    }

    pub(crate) fn approve(&mut self) -> Result<(), EscrowError> {
        self.check_decision("approve")?;
        self.transition(MortgageState::Approved);
        Ok(())
    }

    pub(crate) fn reject(&mut self) -> Result<(), EscrowError> {
        self.check_decision("reject")?;
        self.transition(MortgageState::Rejected);
        Ok(())
    }

    /// Validates a deposit of `amount` sent by `caller`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidState`] unless [`MortgageState::Approved`].
    /// - [`EscrowError::Unauthorized`] if `caller` is not the borrower.
    /// - [`EscrowError::InvalidAmount`] unless `amount` equals the deposit.
    pub fn check_deposit(&self, caller: PartyId, amount: u128) -> Result<(), EscrowError> {
        self.ensure_state(MortgageState::Approved, "deposit into")?;
        if caller != self.terms.borrower {
            return Err(EscrowError::Unauthorized {
                caller,
                operation: "send the deposit",
            });
        }
        if amount != self.terms.deposit_amount {
            return Err(EscrowError::InvalidAmount(format!(
                "deposit must be exactly {}, got {amount}",
                self.terms.deposit_amount
            )));
        }
        Ok(())
    }

    /// Transfers that fund the mortgage, in execution order: the deposit
    /// into escrow, the loan capital into escrow, the property value out to
    /// the vendor.
    #[must_use]
    pub fn funding_transfers(&self) -> [Transfer; 3] {
        let escrow = Account::Escrow(self.id);
        [
            Transfer::new(
                Account::Party(self.terms.borrower),
                escrow,
                self.terms.deposit_amount,
            ),
            Transfer::new(Account::Pool, escrow, self.terms.loan_amount),
            Transfer::new(
                escrow,
                Account::Party(self.terms.vendor),
                self.terms.property_value,
            ),
        ]
    }

    pub(crate) fn mark_funded(&mut self) {
        self.transition(MortgageState::DepositReceived);
    }

    /// Validates a repayment of `amount` sent by `caller`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidState`] unless [`MortgageState::DepositReceived`].
    /// - [`EscrowError::Unauthorized`] if `policy` does not permit `caller`.
    /// - [`EscrowError::InvalidAmount`] if `amount` is zero.
    /// - [`EscrowError::OverRepayment`] if the repayment exceeds what is owed.
    pub fn check_repayment(
        &self,
        caller: PartyId,
        amount: u128,
        policy: RepaymentPolicy,
    ) -> Result<(), EscrowError> {
        self.ensure_state(MortgageState::DepositReceived, "repay")?;
        if !policy.permits(caller, self.terms.borrower) {
            return Err(EscrowError::Unauthorized {
                caller,
                operation: "repay this mortgage",
            });
        }
        if amount == 0 {
            return Err(EscrowError::InvalidAmount(
                "repayment must be positive".to_string(),
            ));
        }
        let outstanding = self.outstanding();
        if amount > outstanding {
            return Err(EscrowError::OverRepayment {
                amount,
                outstanding,
            });
        }
        Ok(())
    }

    /// Records a validated repayment. Returns `true` if it completed the loan.
    pub(crate) fn record_repayment(&mut self, amount: u128) -> bool {
        self.amount_repaid += amount;
        if self.amount_repaid == self.terms.loan_amount {
            self.transition(MortgageState::Completed);
            true
        } else {
            self.last_modified_at = Utc::now();
            false
        }
    }

    fn transition(&mut self, to: MortgageState) {
        self.state = to;
        self.last_modified_at = Utc::now();
    }
}

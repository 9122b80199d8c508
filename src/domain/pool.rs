//! Ledger accounting for the shared lending pool.
//!
//! [`Pool`] aggregates lender capital and the principal lent out to funded
//! mortgages. The free balance is never stored: it is always
//! `total_contributions - total_lent`, which is also the balance the
//! value-transfer collaborator holds for [`super::transfer::Account::Pool`].

use std::collections::HashMap;

use super::{MortgageId, PartyId};
use crate::error::EscrowError;

/// Aggregate and per-lender accounting of the lending pool.
#[derive(Debug)]
pub struct Pool {
    owner: PartyId,
    contributions: HashMap<PartyId, u128>,
    total_contributions: u128,
    total_lent: u128,
    outstanding: HashMap<MortgageId, u128>,
}

impl Pool {
    /// Creates an empty pool administered by `owner`.
    #[must_use]
    pub fn new(owner: PartyId) -> Self {
        Self {
            owner,
            contributions: HashMap::new(),
            total_contributions: 0,
            total_lent: 0,
            outstanding: HashMap::new(),
        }
    }

    /// Ledger administrator. Immutable after creation.
    #[must_use]
    pub const fn owner(&self) -> PartyId {
        self.owner
    }

    /// Fails unless `caller` is the owner.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::Unauthorized`] for any other identity.
    pub fn ensure_owner(
        &self,
        caller: PartyId,
        operation: &'static str,
    ) -> Result<(), EscrowError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(EscrowError::Unauthorized { caller, operation })
        }
    }

    /// Sum of every lender's contribution.
    #[must_use]
    pub const fn total_contributions(&self) -> u128 {
        self.total_contributions
    }

    /// Principal disbursed and not yet repaid.
    #[must_use]
    pub const fn total_lent(&self) -> u128 {
        self.total_lent
    }

    /// Capital available for new loans.
    #[must_use]
    pub const fn free_balance(&self) -> u128 {
        self.total_contributions.saturating_sub(self.total_lent)
    }

    /// Cumulative contribution of `lender` (zero if it never contributed).
    #[must_use]
    pub fn contribution_of(&self, lender: PartyId) -> u128 {
        self.contributions.get(&lender).copied().unwrap_or(0)
    }

    /// Number of distinct lenders.
    #[must_use]
    pub fn lender_count(&self) -> usize {
        self.contributions.len()
    }

    /// Principal still outstanding for `mortgage_id`.
    #[must_use]
    pub fn outstanding_of(&self, mortgage_id: MortgageId) -> u128 {
        self.outstanding.get(&mortgage_id).copied().unwrap_or(0)
    }

    /// Validates a contribution before any units move.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidAmount`] if `amount` is zero or the
    /// pool total would overflow.
    pub fn check_contribution(&self, amount: u128) -> Result<(), EscrowError> {
        if amount == 0 {
            return Err(EscrowError::InvalidAmount(
                "contribution must be positive".to_string(),
            ));
        }
        if self.total_contributions.checked_add(amount).is_none() {
            return Err(EscrowError::InvalidAmount(
                "contribution overflows the pool total".to_string(),
            ));
        }
        Ok(())
    }

    /// Books a contribution whose units already reached the pool account.
    ///
    /// # Errors
    ///
    /// Same as [`Pool::check_contribution`]; nothing changes on error.
    pub(crate) fn contribute(&mut self, lender: PartyId, amount: u128) -> Result<(), EscrowError> {
        self.check_contribution(amount)?;
        self.total_contributions += amount;
        *self.contributions.entry(lender).or_insert(0) += amount;
        Ok(())
    }

    /// Validates a loan-capital withdrawal of `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InsufficientPoolFunds`] if the free balance
    /// is below `amount`.
    pub fn check_withdrawal(&self, amount: u128) -> Result<(), EscrowError> {
        let available = self.free_balance();
        if amount > available {
            return Err(EscrowError::InsufficientPoolFunds {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Books `amount` of loan principal leaving the pool for `mortgage_id`.
    ///
    /// # Errors
    ///
    /// Same as [`Pool::check_withdrawal`]; nothing changes on error.
    pub(crate) fn withdraw_loan_capital(
        &mut self,
        mortgage_id: MortgageId,
        amount: u128,
    ) -> Result<(), EscrowError> {
        self.check_withdrawal(amount)?;
        self.total_lent += amount;
        *self.outstanding.entry(mortgage_id).or_insert(0) += amount;
        Ok(())
    }

    /// Validates a repayment of `amount` towards `mortgage_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::OverRepayment`] if `amount` exceeds the
    /// mortgage's outstanding principal.
    pub fn check_repayment(
        &self,
        mortgage_id: MortgageId,
        amount: u128,
    ) -> Result<(), EscrowError> {
        let outstanding = self.outstanding_of(mortgage_id);
        if amount > outstanding {
            return Err(EscrowError::OverRepayment {
                amount,
                outstanding,
            });
        }
        Ok(())
    }

    /// Books a repayment whose units already reached the pool account.
    /// Returns the principal still outstanding for the mortgage.
    ///
    /// # Errors
    ///
    /// Same as [`Pool::check_repayment`]; nothing changes on error.
    pub(crate) fn receive_repayment(
        &mut self,
        mortgage_id: MortgageId,
        amount: u128,
    ) -> Result<u128, EscrowError> {
        self.check_repayment(mortgage_id, amount)?;
        let remaining = self.outstanding_of(mortgage_id) - amount;
        if remaining == 0 {
            self.outstanding.remove(&mortgage_id);
        } else {
            self.outstanding.insert(mortgage_id, remaining);
        }
        self.total_lent -= amount;
        Ok(remaining)
    }

    /// Returns `true` if the aggregate counters agree with the per-lender
    /// and per-mortgage entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let contributed: Option<u128> = self
            .contributions
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v));
        let lent: Option<u128> = self
            .outstanding
            .values()
            .try_fold(0u128, |acc, v| acc.checked_add(*v));
        contributed == Some(self.total_contributions)
            && lent == Some(self.total_lent)
            && self.total_lent <= self.total_contributions
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pool_with(lenders: &[u128]) -> Pool {
        let mut pool = Pool::new(PartyId::new());
        for amount in lenders {
            tokio_test::assert_ok!(pool.contribute(PartyId::new(), *amount));
        }
        pool
    }

    #[test]
    fn empty_pool_has_zero_totals() {
        let pool = Pool::new(PartyId::new());
        assert_eq!(pool.total_contributions(), 0);
        assert_eq!(pool.total_lent(), 0);
        assert_eq!(pool.free_balance(), 0);
        assert!(pool.is_consistent());
    }

    #[test]
    fn contributions_accumulate_per_lender() {
        let mut pool = Pool::new(PartyId::new());
        let lender = PartyId::new();
        tokio_test::assert_ok!(pool.contribute(lender, 4));
        tokio_test::assert_ok!(pool.contribute(lender, 5));
        tokio_test::assert_ok!(pool.contribute(PartyId::new(), 1));

        assert_eq!(pool.contribution_of(lender), 9);
        assert_eq!(pool.total_contributions(), 10);
        assert_eq!(pool.lender_count(), 2);
        assert!(pool.is_consistent());
    }

    #[test]
    fn zero_contribution_is_invalid() {
        let mut pool = Pool::new(PartyId::new());
        assert!(matches!(
            pool.contribute(PartyId::new(), 0),
            Err(EscrowError::InvalidAmount(_))
        ));
        assert_eq!(pool.lender_count(), 0);
    }

    #[test]
    fn only_owner_passes_owner_check() {
        let owner = PartyId::new();
        let pool = Pool::new(owner);
        tokio_test::assert_ok!(pool.ensure_owner(owner, "approve"));
        assert!(matches!(
            pool.ensure_owner(PartyId::new(), "approve"),
            Err(EscrowError::Unauthorized { .. })
        ));
    }

    #[test]
    fn withdrawal_beyond_free_balance_fails_without_change() {
        let mut pool = pool_with(&[5]);
        let id = MortgageId::new();
        let Err(EscrowError::InsufficientPoolFunds {
            requested,
            available,
        }) = pool.withdraw_loan_capital(id, 7)
        else {
            panic!("expected insufficient funds");
        };
        assert_eq!((requested, available), (7, 5));
        assert_eq!(pool.total_lent(), 0);
        assert_eq!(pool.outstanding_of(id), 0);
    }

    #[test]
    fn lending_and_repaying_conserve_funds() {
        let mut pool = pool_with(&[9]);
        let id = MortgageId::new();

        tokio_test::assert_ok!(pool.withdraw_loan_capital(id, 7));
        assert_eq!(pool.total_lent(), 7);
        assert_eq!(pool.free_balance(), 2);
        assert_eq!(
            pool.total_contributions() - pool.total_lent(),
            pool.free_balance()
        );

        assert_eq!(pool.receive_repayment(id, 3).ok(), Some(4));
        assert_eq!(pool.free_balance(), 5);
        assert_eq!(pool.receive_repayment(id, 4).ok(), Some(0));
        assert_eq!(pool.total_lent(), 0);
        assert_eq!(pool.free_balance(), 9);
        assert!(pool.is_consistent());
    }

    #[test]
    fn over_repayment_is_rejected_before_any_change() {
        let mut pool = pool_with(&[9]);
        let id = MortgageId::new();
        tokio_test::assert_ok!(pool.withdraw_loan_capital(id, 7));

        assert!(matches!(
            pool.receive_repayment(id, 8),
            Err(EscrowError::OverRepayment {
                amount: 8,
                outstanding: 7
            })
        ));
        assert_eq!(pool.total_lent(), 7);
        assert_eq!(pool.outstanding_of(id), 7);
    }

    #[test]
    fn repayment_for_unfunded_mortgage_is_over_repayment() {
        let mut pool = pool_with(&[9]);
        assert!(matches!(
            pool.receive_repayment(MortgageId::new(), 1),
            Err(EscrowError::OverRepayment { outstanding: 0, .. })
        ));
    }
}

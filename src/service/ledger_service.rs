//! Ledger service: atomic escrow operations and event emission.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::domain::{
    Account, EventBus, LedgerEvent, Mortgage, MortgageId, MortgageRegistry, MortgageState,
    MortgageTerms, PartyId, Pool, RepaymentPolicy, Transfer, TransferBatch, ValueTransfer,
};
use crate::error::EscrowError;

/// Point-in-time view of the pool's aggregate figures.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LedgerSummary {
    /// Ledger administrator.
    pub owner: PartyId,
    /// Sum of all lender contributions (string-encoded u128).
    pub total_contributions: String,
    /// Outstanding principal across all mortgages (string-encoded u128).
    pub total_lent: String,
    /// Capital available for new loans (string-encoded u128).
    pub free_balance: String,
    /// Number of distinct lenders.
    pub lender_count: usize,
    /// Number of mortgages ever created.
    pub mortgage_count: usize,
    /// Whether the counters agree with each other and with the pool
    /// account held by the value-transfer collaborator.
    pub conserved: bool,
}

/// Orchestration layer for every ledger and mortgage operation.
///
/// Owns the [`Pool`] counters behind a single mutex, the
/// [`MortgageRegistry`] with per-mortgage locks, the [`ValueTransfer`]
/// collaborator and the [`EventBus`]. Every mutation follows the pattern:
/// acquire locks (mortgage first, then pool) → validate → run transfers in
/// a [`TransferBatch`] → book the result → commit the batch → emit events.
/// Any failure before the commit reverses the batch, so an operation either
/// takes full effect or none at all.
#[derive(Debug, Clone)]
pub struct LedgerService {
    pool: Arc<Mutex<Pool>>,
    registry: Arc<MortgageRegistry>,
    bank: Arc<dyn ValueTransfer>,
    event_bus: EventBus,
    repayment_policy: RepaymentPolicy,
}

impl LedgerService {
    /// Creates a service for a new, empty ledger administered by `owner`.
    #[must_use]
    pub fn new(
        owner: PartyId,
        bank: Arc<dyn ValueTransfer>,
        event_bus: EventBus,
        repayment_policy: RepaymentPolicy,
    ) -> Self {
        Self {
            pool: Arc::new(Mutex::new(Pool::new(owner))),
            registry: Arc::new(MortgageRegistry::new()),
            bank,
            event_bus,
            repayment_policy,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`MortgageRegistry`].
    #[must_use]
    pub fn registry(&self) -> &Arc<MortgageRegistry> {
        &self.registry
    }

    /// Returns the configured repayment policy.
    #[must_use]
    pub const fn repayment_policy(&self) -> RepaymentPolicy {
        self.repayment_policy
    }

    /// Adds `amount` of `lender`'s capital to the pool. Returns the new
    /// pool total.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidAmount`] if `amount` is zero.
    /// - [`EscrowError::TransferFailed`] if the lender cannot pay.
    pub async fn contribute(&self, lender: PartyId, amount: u128) -> Result<u128, EscrowError> {
        let mut pool = self.pool.lock().await;
        pool.check_contribution(amount)?;

        let mut batch = TransferBatch::new(self.bank.as_ref());
        if let Err(e) = batch.apply(Transfer::new(Account::Party(lender), Account::Pool, amount)) {
            tracing::warn!(%lender, amount, error = %e, "contribution transfer refused");
            return Err(batch.rollback(e).into());
        }
        pool.contribute(lender, amount)?;
        batch.commit();

        let total = pool.total_contributions();
        drop(pool);

        let _ = self.event_bus.publish(LedgerEvent::ContributionReceived {
            lender,
            amount: amount.to_string(),
            total_contributions: total.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(%lender, amount, total_contributions = total, "contribution received");
        Ok(total)
    }

    /// Registers a new application. No funds move.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidAmount`] if either amount is zero or
    /// their sum overflows.
    pub async fn apply_for_mortgage(
        &self,
        borrower: PartyId,
        deposit_amount: u128,
        loan_amount: u128,
        vendor: PartyId,
    ) -> Result<MortgageId, EscrowError> {
        let terms = MortgageTerms::new(borrower, vendor, deposit_amount, loan_amount)?;
        let mortgage_id = self
            .registry
            .insert(Mortgage::new(MortgageId::new(), terms))
            .await?;

        let _ = self.event_bus.publish(LedgerEvent::MortgageApplied {
            mortgage_id,
            borrower,
            vendor,
            deposit_amount: deposit_amount.to_string(),
            loan_amount: loan_amount.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            %mortgage_id,
            %borrower,
            %vendor,
            deposit_amount,
            loan_amount,
            "mortgage application received"
        );
        Ok(mortgage_id)
    }

    /// Owner approves an application.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::MortgageNotFound`] for an unknown id.
    /// - [`EscrowError::Unauthorized`] unless `caller` is the owner.
    /// - [`EscrowError::InvalidState`] unless the mortgage is `Applied`.
    pub async fn approve_mortgage(
        &self,
        caller: PartyId,
        mortgage_id: MortgageId,
    ) -> Result<(), EscrowError> {
        let entry_lock = self.registry.get(mortgage_id).await?;
        self.pool.lock().await.ensure_owner(caller, "approve mortgages")?;

        entry_lock.write().await.approve()?;

        let _ = self.event_bus.publish(LedgerEvent::MortgageApproved {
            mortgage_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%mortgage_id, "mortgage approved");
        Ok(())
    }

    /// Owner rejects an application. Nothing is held in escrow while a
    /// mortgage is `Applied`, so nothing is refunded.
    ///
    /// # Errors
    ///
    /// Same as [`LedgerService::approve_mortgage`].
    pub async fn reject_mortgage(
        &self,
        caller: PartyId,
        mortgage_id: MortgageId,
    ) -> Result<(), EscrowError> {
        let entry_lock = self.registry.get(mortgage_id).await?;
        self.pool.lock().await.ensure_owner(caller, "reject mortgages")?;

        entry_lock.write().await.reject()?;

        let _ = self.event_bus.publish(LedgerEvent::MortgageRejected {
            mortgage_id,
            timestamp: Utc::now(),
        });

        tracing::info!(%mortgage_id, "mortgage rejected");
        Ok(())
    }

    /// Borrower sends the deposit, funding the mortgage.
    ///
    /// Collects the deposit into escrow, withdraws the loan capital from the
    /// pool, pays the property value to the vendor and moves the mortgage
    /// to `DepositReceived`, all or nothing. Returns the funded mortgage.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::MortgageNotFound`] for an unknown id.
    /// - [`EscrowError::InvalidState`] unless the mortgage is `Approved`.
    /// - [`EscrowError::Unauthorized`] unless `caller` is the borrower.
    /// - [`EscrowError::InvalidAmount`] unless `amount` is the exact deposit.
    /// - [`EscrowError::InsufficientPoolFunds`] if the pool cannot cover
    ///   the loan.
    /// - [`EscrowError::TransferFailed`] if any transfer is refused; the
    ///   borrower's deposit is returned.
    pub async fn send_deposit(
        &self,
        caller: PartyId,
        mortgage_id: MortgageId,
        amount: u128,
    ) -> Result<Mortgage, EscrowError> {
        let entry_lock = self.registry.get(mortgage_id).await?;
        let mut mortgage = entry_lock.write().await;
        mortgage.check_deposit(caller, amount)?;

        let mut pool = self.pool.lock().await;
        if let Err(e) = pool.check_withdrawal(mortgage.loan_amount()) {
            tracing::warn!(%mortgage_id, error = %e, "deposit refused");
            return Err(e);
        }

        let mut batch = TransferBatch::new(self.bank.as_ref());
        for transfer in mortgage.funding_transfers() {
            if let Err(e) = batch.apply(transfer) {
                tracing::warn!(
                    %mortgage_id,
                    from = %transfer.from,
                    to = %transfer.to,
                    error = %e,
                    "funding transfer refused, reversing deposit"
                );
                return Err(batch.rollback(e).into());
            }
        }
        pool.withdraw_loan_capital(mortgage_id, mortgage.loan_amount())?;
        mortgage.mark_funded();
        batch.commit();

        let total_lent = pool.total_lent();
        drop(pool);
        let funded = mortgage.clone();
        drop(mortgage);

        let _ = self.event_bus.publish(LedgerEvent::MortgageFunded {
            mortgage_id,
            vendor: funded.vendor(),
            property_value: funded.property_value().to_string(),
            total_lent: total_lent.to_string(),
            timestamp: Utc::now(),
        });

        tracing::info!(
            %mortgage_id,
            vendor = %funded.vendor(),
            property_value = funded.property_value(),
            total_lent,
            "mortgage funded"
        );
        Ok(funded)
    }

    /// Sends a repayment towards a funded mortgage. Returns the mortgage
    /// after the repayment; it is `Completed` once the loan is cleared.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::MortgageNotFound`] for an unknown id.
    /// - [`EscrowError::InvalidState`] unless the mortgage is
    ///   `DepositReceived`.
    /// - [`EscrowError::Unauthorized`] if the repayment policy does not
    ///   permit `caller`.
    /// - [`EscrowError::InvalidAmount`] if `amount` is zero.
    /// - [`EscrowError::OverRepayment`] if `amount` exceeds what is owed.
    /// - [`EscrowError::TransferFailed`] if the payer cannot pay.
    pub async fn send_repayment(
        &self,
        caller: PartyId,
        mortgage_id: MortgageId,
        amount: u128,
    ) -> Result<Mortgage, EscrowError> {
        let entry_lock = self.registry.get(mortgage_id).await?;
        let mut mortgage = entry_lock.write().await;
        mortgage.check_repayment(caller, amount, self.repayment_policy)?;

        let mut pool = self.pool.lock().await;
        pool.check_repayment(mortgage_id, amount)?;

        let mut batch = TransferBatch::new(self.bank.as_ref());
        if let Err(e) = batch.apply(Transfer::new(Account::Party(caller), Account::Pool, amount)) {
            tracing::warn!(%mortgage_id, payer = %caller, error = %e, "repayment transfer refused");
            return Err(batch.rollback(e).into());
        }
        let outstanding = pool.receive_repayment(mortgage_id, amount)?;
        let completed = mortgage.record_repayment(amount);
        batch.commit();

        drop(pool);
        let repaid = mortgage.clone();
        drop(mortgage);

        let _ = self.event_bus.publish(LedgerEvent::RepaymentReceived {
            mortgage_id,
            payer: caller,
            amount: amount.to_string(),
            outstanding: outstanding.to_string(),
            timestamp: Utc::now(),
        });
        tracing::info!(%mortgage_id, payer = %caller, amount, outstanding, "repayment received");

        if completed {
            let _ = self.event_bus.publish(LedgerEvent::MortgageCompleted {
                mortgage_id,
                timestamp: Utc::now(),
            });
            tracing::info!(%mortgage_id, "mortgage completed");
        }

        Ok(repaid)
    }

    /// Outstanding principal across all mortgages.
    pub async fn total_lent(&self) -> u128 {
        self.pool.lock().await.total_lent()
    }

    /// Sum of all lender contributions.
    pub async fn total_contributions(&self) -> u128 {
        self.pool.lock().await.total_contributions()
    }

    /// Capital available for new loans.
    pub async fn free_balance(&self) -> u128 {
        self.pool.lock().await.free_balance()
    }

    /// Cumulative contribution of `lender`.
    pub async fn contribution_of(&self, lender: PartyId) -> u128 {
        self.pool.lock().await.contribution_of(lender)
    }

    /// Current state of a mortgage.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::MortgageNotFound`] for an unknown id.
    pub async fn mortgage_state(
        &self,
        mortgage_id: MortgageId,
    ) -> Result<MortgageState, EscrowError> {
        let entry_lock = self.registry.get(mortgage_id).await?;
        let state = entry_lock.read().await.state();
        Ok(state)
    }

    /// Snapshot of a mortgage.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::MortgageNotFound`] for an unknown id.
    pub async fn get_mortgage(&self, mortgage_id: MortgageId) -> Result<Mortgage, EscrowError> {
        let entry_lock = self.registry.get(mortgage_id).await?;
        let mortgage = entry_lock.read().await.clone();
        Ok(mortgage)
    }

    /// Snapshots of all mortgages, optionally filtered by state.
    pub async fn list_mortgages(&self, state_filter: Option<MortgageState>) -> Vec<Mortgage> {
        self.registry.list(state_filter).await
    }

    /// Balance of an account at the value-transfer collaborator.
    #[must_use]
    pub fn balance_of(&self, account: Account) -> u128 {
        self.bank.balance(account)
    }

    /// Aggregate view of the ledger, including a conservation check.
    pub async fn summary(&self) -> LedgerSummary {
        let mortgage_count = self.registry.len().await;
        let pool = self.pool.lock().await;
        let conserved =
            pool.is_consistent() && self.bank.balance(Account::Pool) == pool.free_balance();
        LedgerSummary {
            owner: pool.owner(),
            total_contributions: pool.total_contributions().to_string(),
            total_lent: pool.total_lent().to_string(),
            free_balance: pool.free_balance().to_string(),
            lender_count: pool.lender_count(),
            mortgage_count,
            conserved,
        }
    }
}

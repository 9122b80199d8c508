//! Domain events reflecting ledger and mortgage mutations.
//!
//! Every committed operation emits a [`LedgerEvent`] through the
//! [`super::EventBus`]. Events are broadcast to WebSocket subscribers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{MortgageId, PartyId};

/// Domain event emitted after every committed mutation.
///
/// Amounts are stored as `String` to preserve u128 precision when
/// serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// A lender added capital to the pool.
    ContributionReceived {
        /// Contributing lender.
        lender: PartyId,
        /// Units contributed.
        amount: String,
        /// Pool total after the contribution.
        total_contributions: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A borrower applied for a mortgage.
    MortgageApplied {
        /// New mortgage identifier.
        mortgage_id: MortgageId,
        /// Applicant.
        borrower: PartyId,
        /// Property vendor.
        vendor: PartyId,
        /// Required deposit.
        deposit_amount: String,
        /// Requested loan principal.
        loan_amount: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The owner approved an application.
    MortgageApproved {
        /// Mortgage identifier.
        mortgage_id: MortgageId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The owner rejected an application.
    MortgageRejected {
        /// Mortgage identifier.
        mortgage_id: MortgageId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Deposit and loan capital were paid out to the vendor.
    MortgageFunded {
        /// Mortgage identifier.
        mortgage_id: MortgageId,
        /// Vendor paid.
        vendor: PartyId,
        /// Units paid to the vendor.
        property_value: String,
        /// Pool principal lent after funding.
        total_lent: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A repayment reached the pool.
    RepaymentReceived {
        /// Mortgage identifier.
        mortgage_id: MortgageId,
        /// Paying party.
        payer: PartyId,
        /// Units repaid.
        amount: String,
        /// Principal still owed on this mortgage.
        outstanding: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The final repayment cleared the loan.
    MortgageCompleted {
        /// Mortgage identifier.
        mortgage_id: MortgageId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LedgerEvent {
    /// Returns the mortgage this event concerns, if any.
    #[must_use]
    pub fn mortgage_id(&self) -> Option<MortgageId> {
        match self {
            Self::ContributionReceived { .. } => None,
            Self::MortgageApplied { mortgage_id, .. }
            | Self::MortgageApproved { mortgage_id, .. }
            | Self::MortgageRejected { mortgage_id, .. }
            | Self::MortgageFunded { mortgage_id, .. }
            | Self::RepaymentReceived { mortgage_id, .. }
            | Self::MortgageCompleted { mortgage_id, .. } => Some(*mortgage_id),
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ContributionReceived { .. } => "contribution_received",
            Self::MortgageApplied { .. } => "mortgage_applied",
            Self::MortgageApproved { .. } => "mortgage_approved",
            Self::MortgageRejected { .. } => "mortgage_rejected",
            Self::MortgageFunded { .. } => "mortgage_funded",
            Self::RepaymentReceived { .. } => "repayment_received",
            Self::MortgageCompleted { .. } => "mortgage_completed",
        }
    }
}

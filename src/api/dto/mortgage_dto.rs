//! Mortgage DTOs for apply, get and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::{PaginationMeta, PaginationParams};
use crate::domain::{Mortgage, MortgageId, MortgageState, PartyId};

/// Request body for `POST /mortgages`. The caller is the borrower.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyMortgageRequest {
    /// Deposit the borrower will pay, as a decimal string.
    #[schema(example = "2")]
    pub deposit_amount: String,
    /// Loan principal requested from the pool, as a decimal string.
    #[schema(example = "7")]
    pub loan_amount: String,
    /// Vendor who receives the property value.
    pub vendor: PartyId,
}

/// Response body for `POST /mortgages` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct ApplyMortgageResponse {
    /// Identifier of the new mortgage.
    pub mortgage_id: MortgageId,
    /// Always `applied`.
    pub state: MortgageState,
}

/// Full mortgage snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct MortgageDto {
    /// Mortgage identifier.
    pub mortgage_id: MortgageId,
    /// Applicant.
    pub borrower: PartyId,
    /// Vendor.
    pub vendor: PartyId,
    /// Required deposit.
    pub deposit_amount: String,
    /// Loan principal.
    pub loan_amount: String,
    /// Deposit plus loan.
    pub property_value: String,
    /// Cumulative repayments.
    pub amount_repaid: String,
    /// Principal still owed (zero before funding).
    pub outstanding: String,
    /// Lifecycle state.
    pub state: MortgageState,
    /// Application time.
    pub created_at: DateTime<Utc>,
    /// Time of the last state change or repayment.
    pub last_modified_at: DateTime<Utc>,
}

impl From<&Mortgage> for MortgageDto {
    fn from(m: &Mortgage) -> Self {
        Self {
            mortgage_id: m.id(),
            borrower: m.borrower(),
            vendor: m.vendor(),
            deposit_amount: m.deposit_amount().to_string(),
            loan_amount: m.loan_amount().to_string(),
            property_value: m.property_value().to_string(),
            amount_repaid: m.amount_repaid().to_string(),
            outstanding: m.outstanding().to_string(),
            state: m.state(),
            created_at: m.created_at(),
            last_modified_at: m.last_modified_at(),
        }
    }
}

/// Response body for `GET /mortgages/{id}/state`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MortgageStateResponse {
    /// Mortgage identifier.
    pub mortgage_id: MortgageId,
    /// Lifecycle state.
    pub state: MortgageState,
}

/// Query parameters for `GET /mortgages`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct MortgageListParams {
    /// Page number (1-indexed). Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page (max 100). Defaults to 20.
    #[serde(default)]
    pub per_page: Option<u32>,
    /// Only return mortgages in this state (e.g. `approved`).
    #[serde(default)]
    pub state: Option<String>,
}

impl MortgageListParams {
    /// Pagination part of the query.
    #[must_use]
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page.unwrap_or(1),
            per_page: self.per_page.unwrap_or(20),
        }
    }
}

/// Response body for `GET /mortgages`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MortgageListResponse {
    /// Mortgages on this page, oldest first.
    pub data: Vec<MortgageDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

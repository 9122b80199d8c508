//! Ledger-level DTOs: contributions and per-lender totals.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::PartyId;

/// Response body for `POST /ledger/contributions`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContributionResponse {
    /// Contributing lender.
    pub lender: PartyId,
    /// Units contributed by this request.
    pub amount: String,
    /// Pool total after the contribution.
    pub total_contributions: String,
}

/// Response body for `GET /ledger/contributions/{party}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LenderContributionResponse {
    /// Lender queried.
    pub lender: PartyId,
    /// Cumulative contribution; `"0"` for parties that never contributed.
    pub contribution: String,
}

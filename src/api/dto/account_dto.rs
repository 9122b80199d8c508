//! Account balance DTOs for the value-transfer collaborator.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::PartyId;

/// Response body for `GET /accounts/{party}` and
/// `POST /accounts/{party}/credit`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountBalanceResponse {
    /// Account holder.
    pub party: PartyId,
    /// Current balance.
    pub balance: String,
}

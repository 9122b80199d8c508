//! Escrow error types with HTTP status code mapping.
//!
//! [`EscrowError`] is the central error type for the ledger, the mortgage
//! state machine and the gateway. Each variant maps to a specific HTTP
//! status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::transfer::TransferError;
use crate::domain::{MortgageId, MortgageState, PartyId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient pool funds: requested 7, available 3",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`EscrowError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Escrow error enum with HTTP status code mapping.
///
/// Every error is raised before the failing operation mutates the ledger,
/// a mortgage, or moves any funds.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                   |
/// |-----------|-------------------|-------------------------------|
/// | 1000–1099 | Validation        | 400 Bad Request               |
/// | 1100–1199 | Identity / Role   | 401 Unauthorized / 403        |
/// | 2000–2199 | Lookup / State    | 404 Not Found / 409 Conflict  |
/// | 3000–3999 | Server            | 500 Internal Server Error     |
/// | 4000–4999 | Fund movement     | 422 Unprocessable Entity      |
#[derive(Debug, thiserror::Error)]
pub enum EscrowError {
    /// Amount is non-positive, does not match a required exact value, or
    /// overflows the unit type.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No caller identity accompanied a caller-sensitive request.
    #[error("missing caller identity")]
    MissingCaller,

    /// The caller is not allowed to perform a role-gated operation.
    #[error("party {caller} is not authorized to {operation}")]
    Unauthorized {
        /// Identity that attempted the operation.
        caller: PartyId,
        /// Operation that was refused.
        operation: &'static str,
    },

    /// Mortgage with the given ID was not found.
    #[error("mortgage not found: {0}")]
    MortgageNotFound(MortgageId),

    /// The mortgage is in a state that does not permit the operation.
    #[error("cannot {operation} mortgage {mortgage_id} in state {state}")]
    InvalidState {
        /// Target mortgage.
        mortgage_id: MortgageId,
        /// State the mortgage was found in.
        state: MortgageState,
        /// Operation that was refused.
        operation: &'static str,
    },

    /// The pool's free balance cannot cover a loan-capital withdrawal.
    #[error("insufficient pool funds: requested {requested}, available {available}")]
    InsufficientPoolFunds {
        /// Loan principal requested.
        requested: u128,
        /// Free balance of the pool at the time of the request.
        available: u128,
    },

    /// A repayment would push cumulative repayment past the principal.
    #[error("over-repayment: {amount} exceeds outstanding principal {outstanding}")]
    OverRepayment {
        /// Amount offered.
        amount: u128,
        /// Principal still outstanding.
        outstanding: u128,
    },

    /// The value-transfer collaborator refused a transfer; every transfer
    /// already made by the same operation has been reversed.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EscrowError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidAmount(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::MissingCaller => 1101,
            Self::Unauthorized { .. } => 1102,
            Self::MortgageNotFound(_) => 2001,
            Self::InvalidState { .. } => 2101,
            Self::InsufficientPoolFunds { .. } => 4001,
            Self::OverRepayment { .. } => 4002,
            Self::TransferFailed(_) => 4003,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidAmount(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingCaller => StatusCode::UNAUTHORIZED,
            Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::MortgageNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState { .. } => StatusCode::CONFLICT,
            Self::InsufficientPoolFunds { .. }
            | Self::OverRepayment { .. }
            | Self::TransferFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for EscrowError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = match &self {
            Self::TransferFailed(TransferError::RollbackIncomplete { .. }) => {
                Some("some transfers of the operation could not be reversed".to_string())
            }
            Self::TransferFailed(_) => {
                Some("all transfers of the operation were reversed".to_string())
            }
            _ => None,
        };
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

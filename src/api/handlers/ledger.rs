//! Ledger handlers: summary and lender contributions.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::caller::Caller;
use crate::api::dto::{
    AmountRequest, ContributionResponse, LenderContributionResponse, parse_amount,
};
use crate::app_state::AppState;
use crate::domain::PartyId;
use crate::error::{ErrorResponse, EscrowError};
use crate::service::LedgerSummary;

/// `GET /ledger` — Pool totals and conservation status.
#[utoipa::path(
    get,
    path = "/api/v1/ledger",
    tag = "Ledger",
    summary = "Ledger summary",
    description = "Returns the owner, total contributions, total lent, free balance and counts. `conserved` reports whether the counters agree with the pool account balance.",
    responses(
        (status = 200, description = "Ledger summary", body = LedgerSummary),
    )
)]
pub async fn get_ledger(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.ledger_service.summary().await)
}

/// `POST /ledger/contributions` — Contribute capital to the pool.
///
/// # Errors
///
/// Returns [`EscrowError`] on a zero or malformed amount, a missing
/// caller, or a refused transfer.
#[utoipa::path(
    post,
    path = "/api/v1/ledger/contributions",
    tag = "Ledger",
    summary = "Contribute capital",
    description = "Moves `amount` from the caller's account into the pool and credits the caller as a lender.",
    params(
        ("x-caller-id" = uuid::Uuid, Header, description = "Contributing lender"),
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Contribution booked", body = ContributionResponse),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 401, description = "Missing caller", body = ErrorResponse),
        (status = 422, description = "Transfer refused", body = ErrorResponse),
    )
)]
pub async fn contribute(
    State(state): State<AppState>,
    Caller(lender): Caller,
    Json(req): Json<AmountRequest>,
) -> Result<impl IntoResponse, EscrowError> {
    let amount = parse_amount("amount", &req.amount)?;
    let total = state.ledger_service.contribute(lender, amount).await?;

    Ok(Json(ContributionResponse {
        lender,
        amount: amount.to_string(),
        total_contributions: total.to_string(),
    }))
}

/// `GET /ledger/contributions/{party}` — Cumulative contribution of a lender.
#[utoipa::path(
    get,
    path = "/api/v1/ledger/contributions/{party}",
    tag = "Ledger",
    summary = "Lender contribution",
    params(
        ("party" = uuid::Uuid, Path, description = "Lender party id"),
    ),
    responses(
        (status = 200, description = "Cumulative contribution", body = LenderContributionResponse),
    )
)]
pub async fn get_contribution(
    State(state): State<AppState>,
    Path(party): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let lender = PartyId::from_uuid(party);
    let contribution = state.ledger_service.contribution_of(lender).await;
    Json(LenderContributionResponse {
        lender,
        contribution: contribution.to_string(),
    })
}

/// Ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger", get(get_ledger))
        .route("/ledger/contributions", post(contribute))
        .route("/ledger/contributions/{party}", get(get_contribution))
}

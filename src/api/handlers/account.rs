//! Account handlers: balances held by the value-transfer collaborator.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{AccountBalanceResponse, AmountRequest, parse_amount};
use crate::app_state::AppState;
use crate::domain::{Account, PartyId};
use crate::error::{ErrorResponse, EscrowError};

/// `GET /accounts/{party}` — Current balance of a party.
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{party}",
    tag = "Accounts",
    summary = "Get account balance",
    params(
        ("party" = uuid::Uuid, Path, description = "Party id"),
    ),
    responses(
        (status = 200, description = "Account balance", body = AccountBalanceResponse),
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(party): Path<uuid::Uuid>,
) -> impl IntoResponse {
    let party = PartyId::from_uuid(party);
    let balance = state.ledger_service.balance_of(Account::Party(party));
    Json(AccountBalanceResponse {
        party,
        balance: balance.to_string(),
    })
}

/// `POST /accounts/{party}/credit` — Mint units into a party's account.
///
/// Only available when the gateway runs with the faucet enabled.
///
/// # Errors
///
/// Returns [`EscrowError::InvalidRequest`] when the faucet is disabled,
/// [`EscrowError::InvalidAmount`] for a malformed amount and
/// [`EscrowError::TransferFailed`] if the balance would overflow.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{party}/credit",
    tag = "Accounts",
    summary = "Credit an account",
    description = "Test faucet: adds `amount` to the party's balance out of thin air.",
    params(
        ("party" = uuid::Uuid, Path, description = "Party id"),
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Account credited", body = AccountBalanceResponse),
        (status = 400, description = "Faucet disabled or invalid amount", body = ErrorResponse),
        (status = 422, description = "Balance overflow", body = ErrorResponse),
    )
)]
pub async fn credit_account(
    State(state): State<AppState>,
    Path(party): Path<uuid::Uuid>,
    Json(req): Json<AmountRequest>,
) -> Result<impl IntoResponse, EscrowError> {
    let Some(bank) = state.faucet.as_ref() else {
        return Err(EscrowError::InvalidRequest(
            "account crediting is disabled".to_string(),
        ));
    };
    let amount = parse_amount("amount", &req.amount)?;
    let party = PartyId::from_uuid(party);
    let balance = bank.credit(party, amount)?;

    tracing::info!(%party, amount, balance, "account credited");
    Ok(Json(AccountBalanceResponse {
        party,
        balance: balance.to_string(),
    }))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts/{party}", get(get_account))
        .route("/accounts/{party}/credit", post(credit_account))
}

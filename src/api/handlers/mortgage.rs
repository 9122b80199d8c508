//! Mortgage handlers: apply, list, get, decide, deposit and repay.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::caller::Caller;
use crate::api::dto::{
    AmountRequest, ApplyMortgageRequest, ApplyMortgageResponse, MortgageDto, MortgageListParams,
    MortgageListResponse, MortgageStateResponse, parse_amount,
};
use crate::app_state::AppState;
use crate::domain::{MortgageId, MortgageState};
use crate::error::{ErrorResponse, EscrowError};

/// `POST /mortgages` — Apply for a mortgage as the calling borrower.
///
/// # Errors
///
/// Returns [`EscrowError`] on malformed or zero amounts, or a missing caller.
#[utoipa::path(
    post,
    path = "/api/v1/mortgages",
    tag = "Mortgages",
    summary = "Apply for a mortgage",
    description = "Registers an application in state `applied`. No funds move until the deposit is sent.",
    params(
        ("x-caller-id" = uuid::Uuid, Header, description = "Borrower"),
    ),
    request_body = ApplyMortgageRequest,
    responses(
        (status = 201, description = "Application registered", body = ApplyMortgageResponse),
        (status = 400, description = "Invalid amounts", body = ErrorResponse),
        (status = 401, description = "Missing caller", body = ErrorResponse),
    )
)]
pub async fn apply_for_mortgage(
    State(state): State<AppState>,
    Caller(borrower): Caller,
    Json(req): Json<ApplyMortgageRequest>,
) -> Result<impl IntoResponse, EscrowError> {
    let deposit = parse_amount("deposit_amount", &req.deposit_amount)?;
    let loan = parse_amount("loan_amount", &req.loan_amount)?;

    let mortgage_id = state
        .ledger_service
        .apply_for_mortgage(borrower, deposit, loan, req.vendor)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplyMortgageResponse {
            mortgage_id,
            state: MortgageState::Applied,
        }),
    ))
}

/// `GET /mortgages` — List mortgages with pagination and optional state filter.
///
/// # Errors
///
/// Returns [`EscrowError::InvalidRequest`] for an unknown state filter.
#[utoipa::path(
    get,
    path = "/api/v1/mortgages",
    tag = "Mortgages",
    summary = "List mortgages",
    description = "Returns a paginated list of mortgages, oldest first, optionally filtered by state.",
    params(MortgageListParams),
    responses(
        (status = 200, description = "Paginated mortgage list", body = MortgageListResponse),
        (status = 400, description = "Unknown state filter", body = ErrorResponse),
    )
)]
pub async fn list_mortgages(
    State(state): State<AppState>,
    Query(params): Query<MortgageListParams>,
) -> Result<impl IntoResponse, EscrowError> {
    let filter = params
        .state
        .as_deref()
        .map(str::parse::<MortgageState>)
        .transpose()?;

    let mortgages = state.ledger_service.list_mortgages(filter).await;
    let (page, pagination) = params.pagination().paginate(mortgages);

    Ok(Json(MortgageListResponse {
        data: page.iter().map(MortgageDto::from).collect(),
        pagination,
    }))
}

/// `GET /mortgages/{id}` — Mortgage details.
///
/// # Errors
///
/// Returns [`EscrowError::MortgageNotFound`] if the mortgage does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/mortgages/{id}",
    tag = "Mortgages",
    summary = "Get mortgage details",
    params(
        ("id" = uuid::Uuid, Path, description = "Mortgage UUID"),
    ),
    responses(
        (status = 200, description = "Mortgage details", body = MortgageDto),
        (status = 404, description = "Mortgage not found", body = ErrorResponse),
    )
)]
pub async fn get_mortgage(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EscrowError> {
    let mortgage = state
        .ledger_service
        .get_mortgage(MortgageId::from_uuid(id))
        .await?;
    Ok(Json(MortgageDto::from(&mortgage)))
}

/// `GET /mortgages/{id}/state` — Lifecycle state only.
///
/// # Errors
///
/// Returns [`EscrowError::MortgageNotFound`] if the mortgage does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/mortgages/{id}/state",
    tag = "Mortgages",
    summary = "Get mortgage state",
    params(
        ("id" = uuid::Uuid, Path, description = "Mortgage UUID"),
    ),
    responses(
        (status = 200, description = "Mortgage state", body = MortgageStateResponse),
        (status = 404, description = "Mortgage not found", body = ErrorResponse),
    )
)]
pub async fn get_mortgage_state(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EscrowError> {
    let mortgage_id = MortgageId::from_uuid(id);
    let mortgage_state = state.ledger_service.mortgage_state(mortgage_id).await?;
    Ok(Json(MortgageStateResponse {
        mortgage_id,
        state: mortgage_state,
    }))
}

/// `POST /mortgages/{id}/approve` — Owner approves an application.
///
/// # Errors
///
/// Returns [`EscrowError`] if the caller is not the owner, the mortgage is
/// unknown, or it is not `applied`.
#[utoipa::path(
    post,
    path = "/api/v1/mortgages/{id}/approve",
    tag = "Mortgages",
    summary = "Approve an application",
    params(
        ("id" = uuid::Uuid, Path, description = "Mortgage UUID"),
        ("x-caller-id" = uuid::Uuid, Header, description = "Ledger owner"),
    ),
    responses(
        (status = 200, description = "Mortgage approved", body = MortgageStateResponse),
        (status = 401, description = "Missing caller", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Mortgage not found", body = ErrorResponse),
        (status = 409, description = "Mortgage is not applied", body = ErrorResponse),
    )
)]
pub async fn approve_mortgage(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EscrowError> {
    let mortgage_id = MortgageId::from_uuid(id);
    state
        .ledger_service
        .approve_mortgage(caller, mortgage_id)
        .await?;
    Ok(Json(MortgageStateResponse {
        mortgage_id,
        state: MortgageState::Approved,
    }))
}

/// `POST /mortgages/{id}/reject` — Owner rejects an application.
///
/// # Errors
///
/// Same as [`approve_mortgage`].
#[utoipa::path(
    post,
    path = "/api/v1/mortgages/{id}/reject",
    tag = "Mortgages",
    summary = "Reject an application",
    description = "Terminal. The borrower may apply again as a new mortgage.",
    params(
        ("id" = uuid::Uuid, Path, description = "Mortgage UUID"),
        ("x-caller-id" = uuid::Uuid, Header, description = "Ledger owner"),
    ),
    responses(
        (status = 200, description = "Mortgage rejected", body = MortgageStateResponse),
        (status = 401, description = "Missing caller", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Mortgage not found", body = ErrorResponse),
        (status = 409, description = "Mortgage is not applied", body = ErrorResponse),
    )
)]
pub async fn reject_mortgage(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, EscrowError> {
    let mortgage_id = MortgageId::from_uuid(id);
    state
        .ledger_service
        .reject_mortgage(caller, mortgage_id)
        .await?;
    Ok(Json(MortgageStateResponse {
        mortgage_id,
        state: MortgageState::Rejected,
    }))
}

/// `POST /mortgages/{id}/deposit` — Borrower sends the exact deposit.
///
/// # Errors
///
/// Returns [`EscrowError`] on a wrong amount, wrong caller, wrong state,
/// insufficient pool funds or a refused transfer. Nothing changes on error.
#[utoipa::path(
    post,
    path = "/api/v1/mortgages/{id}/deposit",
    tag = "Mortgages",
    summary = "Send the deposit",
    description = "Collects the deposit, withdraws the loan from the pool and pays the property value to the vendor in one all-or-nothing step.",
    params(
        ("id" = uuid::Uuid, Path, description = "Mortgage UUID"),
        ("x-caller-id" = uuid::Uuid, Header, description = "Borrower"),
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Mortgage funded", body = MortgageDto),
        (status = 400, description = "Amount is not the agreed deposit", body = ErrorResponse),
        (status = 403, description = "Caller is not the borrower", body = ErrorResponse),
        (status = 404, description = "Mortgage not found", body = ErrorResponse),
        (status = 409, description = "Mortgage is not approved", body = ErrorResponse),
        (status = 422, description = "Pool cannot cover the loan, or a transfer was refused", body = ErrorResponse),
    )
)]
pub async fn send_deposit(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AmountRequest>,
) -> Result<impl IntoResponse, EscrowError> {
    let amount = parse_amount("amount", &req.amount)?;
    let mortgage = state
        .ledger_service
        .send_deposit(caller, MortgageId::from_uuid(id), amount)
        .await?;
    Ok(Json(MortgageDto::from(&mortgage)))
}

/// `POST /mortgages/{id}/repayments` — Repay part or all of the loan.
///
/// # Errors
///
/// Returns [`EscrowError`] on a zero amount, an over-repayment, a caller
/// the repayment policy refuses, wrong state or a refused transfer.
#[utoipa::path(
    post,
    path = "/api/v1/mortgages/{id}/repayments",
    tag = "Mortgages",
    summary = "Send a repayment",
    description = "Moves `amount` from the caller into the pool. The mortgage completes when the loan is fully repaid.",
    params(
        ("id" = uuid::Uuid, Path, description = "Mortgage UUID"),
        ("x-caller-id" = uuid::Uuid, Header, description = "Payer"),
    ),
    request_body = AmountRequest,
    responses(
        (status = 200, description = "Repayment booked", body = MortgageDto),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 403, description = "Payer not permitted", body = ErrorResponse),
        (status = 404, description = "Mortgage not found", body = ErrorResponse),
        (status = 409, description = "Mortgage is not funded", body = ErrorResponse),
        (status = 422, description = "Over-repayment or transfer refused", body = ErrorResponse),
    )
)]
pub async fn send_repayment(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<AmountRequest>,
) -> Result<impl IntoResponse, EscrowError> {
    let amount = parse_amount("amount", &req.amount)?;
    let mortgage = state
        .ledger_service
        .send_repayment(caller, MortgageId::from_uuid(id), amount)
        .await?;
    Ok(Json(MortgageDto::from(&mortgage)))
}

/// Mortgage routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mortgages", post(apply_for_mortgage).get(list_mortgages))
        .route("/mortgages/{id}", get(get_mortgage))
        .route("/mortgages/{id}/state", get(get_mortgage_state))
        .route("/mortgages/{id}/approve", post(approve_mortgage))
        .route("/mortgages/{id}/reject", post(reject_mortgage))
        .route("/mortgages/{id}/deposit", post(send_deposit))
        .route("/mortgages/{id}/repayments", post(send_repayment))
}

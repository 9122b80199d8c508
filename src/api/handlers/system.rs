//! System endpoints: health check and ledger configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::RepaymentPolicy;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Repayment policy in effect.
#[derive(Debug, Serialize, ToSchema)]
pub struct RepaymentPolicyResponse {
    policy: &'static str,
    description: &'static str,
}

/// `GET /config/repayment-policy` — Who may repay a funded mortgage.
#[utoipa::path(
    get,
    path = "/config/repayment-policy",
    tag = "System",
    summary = "Repayment policy",
    responses(
        (status = 200, description = "Repayment policy in effect", body = RepaymentPolicyResponse),
    )
)]
pub async fn repayment_policy_handler(State(state): State<AppState>) -> impl IntoResponse {
    let policy = state.ledger_service.repayment_policy();
    let description = match policy {
        RepaymentPolicy::BorrowerOnly => "only the borrower may repay",
        RepaymentPolicy::AnyParty => "any party may repay on the borrower's behalf",
    };
    Json(RepaymentPolicyResponse {
        policy: policy.as_str(),
        description,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/repayment-policy", get(repayment_policy_handler))
}

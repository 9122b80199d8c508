//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; the caller is
//! identified by the [`caller::CALLER_HEADER`] header.

pub mod caller;
pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "loanpool-gateway",
        description = "Pooled-capital mortgage escrow: lenders fund a shared pool, borrowers apply, the owner approves, deposits release loan capital to vendors and repayments flow back."
    ),
    paths(
        handlers::ledger::get_ledger,
        handlers::ledger::contribute,
        handlers::ledger::get_contribution,
        handlers::mortgage::apply_for_mortgage,
        handlers::mortgage::list_mortgages,
        handlers::mortgage::get_mortgage,
        handlers::mortgage::get_mortgage_state,
        handlers::mortgage::approve_mortgage,
        handlers::mortgage::reject_mortgage,
        handlers::mortgage::send_deposit,
        handlers::mortgage::send_repayment,
        handlers::account::get_account,
        handlers::account::credit_account,
        handlers::system::health_handler,
        handlers::system::repayment_policy_handler,
    ),
    components(schemas(crate::error::ErrorResponse, crate::error::ErrorBody)),
    tags(
        (name = "Ledger", description = "Pool totals and lender contributions"),
        (name = "Mortgages", description = "Mortgage lifecycle"),
        (name = "Accounts", description = "Balances at the value-transfer collaborator"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, OpenAPI and the HTTP
/// middleware stack.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
    #[cfg(not(feature = "swagger-ui"))]
    let router = router.route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(ApiDoc::openapi()) }),
    );

    router
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

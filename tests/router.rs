//! In-process router tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::panic)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use loanpool_gateway::api;
use loanpool_gateway::app_state::AppState;
use loanpool_gateway::domain::{PartyId, RepaymentPolicy};
use serde_json::Value;
use tower::ServiceExt;

fn app(policy: RepaymentPolicy, faucet: bool) -> Router {
    let state = AppState::in_memory(PartyId::new(), policy, 16, faucet);
    api::build_app(state, Duration::from_secs(5))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let Ok(response) = app.oneshot(request).await else {
        panic!("router failed");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body read failed");
    };
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    let Ok(request) = Request::get(uri).body(Body::empty()) else {
        panic!("bad request");
    };
    request
}

#[tokio::test]
async fn health_reports_version() {
    let (status, body) = call(app(RepaymentPolicy::BorrowerOnly, false), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.get("version").and_then(Value::as_str),
        Some(env!("CARGO_PKG_VERSION"))
    );
}

#[tokio::test]
async fn repayment_policy_is_exposed() {
    let (status, body) = call(
        app(RepaymentPolicy::AnyParty, false),
        get("/config/repayment-policy"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("policy").and_then(Value::as_str), Some("any_party"));
}

#[tokio::test]
async fn faucet_disabled_rejects_credit() {
    let Ok(request) = Request::post(format!("/api/v1/accounts/{}/credit", PartyId::new()))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"amount":"5"}"#))
    else {
        panic!("bad request");
    };
    let (status, body) = call(app(RepaymentPolicy::BorrowerOnly, false), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("error").and_then(|e| e.get("code")).and_then(Value::as_u64),
        Some(1002)
    );
}

#[tokio::test]
async fn empty_ledger_is_conserved() {
    let (status, body) = call(
        app(RepaymentPolicy::BorrowerOnly, false),
        get("/api/v1/ledger"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("total_contributions").and_then(Value::as_str), Some("0"));
    assert_eq!(body.get("mortgage_count").and_then(Value::as_u64), Some(0));
    assert_eq!(body.get("conserved").and_then(Value::as_bool), Some(true));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = call(
        app(RepaymentPolicy::BorrowerOnly, false),
        get("/api-docs/openapi.json"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body
        .get("paths")
        .and_then(|p| p.get("/api/v1/mortgages/{id}/deposit"))
        .is_some());
}

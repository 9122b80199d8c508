//! Black-box tests of the REST API against a live server.

#![allow(clippy::panic)]

mod common;

use common::{TestServer, error_code, field};
use loanpool_gateway::domain::{PartyId, RepaymentPolicy};
use serde_json::json;

/// Lender contributes 9, borrower applies with deposit 2 and loan 7.
async fn applied(server: &TestServer) -> (String, PartyId, PartyId) {
    let lender = server.funded_party(9).await;
    let (status, body) = server
        .post("/api/v1/ledger/contributions", Some(lender), json!({ "amount": "9" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "total_contributions"), "9");

    let borrower = server.funded_party(2).await;
    let vendor = PartyId::new();
    let (status, body) = server
        .post(
            "/api/v1/mortgages",
            Some(borrower),
            json!({ "deposit_amount": "2", "loan_amount": "7", "vendor": vendor }),
        )
        .await;
    assert_eq!(status, 201);
    assert_eq!(field(&body, "state"), "applied");
    (field(&body, "mortgage_id"), borrower, vendor)
}

#[tokio::test]
async fn full_lifecycle_over_http() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let (id, borrower, vendor) = applied(&server).await;

    let (status, _) = server
        .post(&format!("/api/v1/mortgages/{id}/approve"), Some(server.owner), json!({}))
        .await;
    assert_eq!(status, 200);

    let (status, body) = server
        .post(&format!("/api/v1/mortgages/{id}/deposit"), Some(borrower), json!({ "amount": "2" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "state"), "deposit_received");
    assert_eq!(field(&body, "outstanding"), "7");
    assert_eq!(server.balance(vendor).await, "9");

    let (_, ledger) = server.get("/api/v1/ledger").await;
    assert_eq!(field(&ledger, "total_lent"), "7");
    assert_eq!(field(&ledger, "free_balance"), "2");
    assert_eq!(ledger.get("conserved"), Some(&json!(true)));

    let _ = server
        .post(&format!("/api/v1/accounts/{borrower}/credit"), None, json!({ "amount": "7" }))
        .await;
    let repay = format!("/api/v1/mortgages/{id}/repayments");
    let (status, body) = server.post(&repay, Some(borrower), json!({ "amount": "8" })).await;
    assert_eq!(status, 422);
    assert_eq!(error_code(&body), 4002);

    for amount in ["3", "4"] {
        let (status, _) = server.post(&repay, Some(borrower), json!({ "amount": amount })).await;
        assert_eq!(status, 200);
    }
    let (_, body) = server.get(&format!("/api/v1/mortgages/{id}/state")).await;
    assert_eq!(field(&body, "state"), "completed");

    let (_, ledger) = server.get("/api/v1/ledger").await;
    assert_eq!(field(&ledger, "total_lent"), "0");
    assert_eq!(field(&ledger, "free_balance"), "9");

    let (_, list) = server.get("/api/v1/mortgages?state=completed").await;
    assert_eq!(
        list.get("pagination").and_then(|p| p.get("total")),
        Some(&json!(1))
    );
}

#[tokio::test]
async fn role_gating_and_caller_identity() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let (id, borrower, _) = applied(&server).await;
    let approve = format!("/api/v1/mortgages/{id}/approve");

    let (status, body) = server.post(&approve, None, json!({})).await;
    assert_eq!(status, 401);
    assert_eq!(error_code(&body), 1101);

    let (status, body) = server.post(&approve, Some(borrower), json!({})).await;
    assert_eq!(status, 403);
    assert_eq!(error_code(&body), 1102);

    let (_, body) = server.get(&format!("/api/v1/mortgages/{id}/state")).await;
    assert_eq!(field(&body, "state"), "applied");
}

#[tokio::test]
async fn wrong_deposit_and_state_errors() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let (id, borrower, vendor) = applied(&server).await;
    let deposit = format!("/api/v1/mortgages/{id}/deposit");

    let (status, body) = server.post(&deposit, Some(borrower), json!({ "amount": "2" })).await;
    assert_eq!(status, 409);
    assert_eq!(error_code(&body), 2101);

    let (status, _) = server
        .post(&format!("/api/v1/mortgages/{id}/approve"), Some(server.owner), json!({}))
        .await;
    assert_eq!(status, 200);

    let (status, body) = server.post(&deposit, Some(borrower), json!({ "amount": "1" })).await;
    assert_eq!(status, 400);
    assert_eq!(error_code(&body), 1001);
    assert_eq!(server.balance(borrower).await, "2");
    assert_eq!(server.balance(vendor).await, "0");
}

#[tokio::test]
async fn rejected_borrower_can_reapply() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let (id, borrower, vendor) = applied(&server).await;

    let (status, body) = server
        .post(&format!("/api/v1/mortgages/{id}/reject"), Some(server.owner), json!({}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(field(&body, "state"), "rejected");

    let (status, body) = server
        .post(
            "/api/v1/mortgages",
            Some(borrower),
            json!({ "deposit_amount": "2", "loan_amount": "7", "vendor": vendor }),
        )
        .await;
    assert_eq!(status, 201);
    assert_ne!(field(&body, "mortgage_id"), id);
}

#[tokio::test]
async fn unknown_mortgage_and_bad_input() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;

    let (status, body) = server
        .get(&format!("/api/v1/mortgages/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, 404);
    assert_eq!(error_code(&body), 2001);

    let (status, _) = server.get("/api/v1/mortgages?state=pending").await;
    assert_eq!(status, 400);

    let (status, body) = server
        .post(
            "/api/v1/ledger/contributions",
            Some(PartyId::new()),
            json!({ "amount": "0" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(error_code(&body), 1001);

    let (status, body) = server
        .post(
            "/api/v1/ledger/contributions",
            Some(PartyId::new()),
            json!({ "amount": "5" }),
        )
        .await;
    assert_eq!(status, 422);
    assert_eq!(error_code(&body), 4003);
}

//! WebSocket subscription tests against a live server.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use common::TestServer;
use futures_util::{SinkExt, StreamExt};
use loanpool_gateway::domain::{PartyId, RepaymentPolicy};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect(server: &TestServer) -> WsStream {
    let url = format!("ws://{}/ws", server.addr);
    let Ok((stream, _)) = tokio_tungstenite::connect_async(url).await else {
        panic!("ws connect failed");
    };
    stream
}

async fn send(ws: &mut WsStream, command: Value) {
    let Ok(()) = ws.send(Message::text(command.to_string())).await else {
        panic!("ws send failed");
    };
}

async fn next_json(ws: &mut WsStream) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), ws.next()).await
        else {
            panic!("no ws message within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(&text) else {
                panic!("ws message is not JSON");
            };
            return value;
        }
    }
}

fn event_type(msg: &Value) -> Option<&str> {
    msg.get("payload")
        .and_then(|p| p.get("event_type"))
        .and_then(Value::as_str)
}

#[tokio::test]
async fn wildcard_subscriber_sees_ledger_events() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let mut ws = connect(&server).await;

    send(&mut ws, json!({ "command": "subscribe", "mortgage_ids": ["*"] })).await;
    let reply = next_json(&mut ws).await;
    assert_eq!(reply.get("type"), Some(&json!("response")));
    assert_eq!(
        reply.get("payload").and_then(|p| p.get("wildcard")),
        Some(&json!(true))
    );

    let lender = server.funded_party(9).await;
    let (status, _) = server
        .post("/api/v1/ledger/contributions", Some(lender), json!({ "amount": "9" }))
        .await;
    assert_eq!(status, 200);

    let event = next_json(&mut ws).await;
    assert_eq!(event.get("type"), Some(&json!("event")));
    assert_eq!(event_type(&event), Some("contribution_received"));
}

#[tokio::test]
async fn mortgage_subscriber_sees_only_its_mortgage() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let borrower = PartyId::new();
    let apply = json!({ "deposit_amount": "2", "loan_amount": "7", "vendor": PartyId::new() });

    let (_, first) = server.post("/api/v1/mortgages", Some(borrower), apply.clone()).await;
    let (_, second) = server.post("/api/v1/mortgages", Some(borrower), apply).await;
    let first_id = common::field(&first, "mortgage_id");
    let second_id = common::field(&second, "mortgage_id");

    let mut ws = connect(&server).await;
    send(
        &mut ws,
        json!({ "id": "sub-1", "type": "command", "payload": {
            "command": "subscribe", "mortgage_ids": [second_id]
        }}),
    )
    .await;
    let reply = next_json(&mut ws).await;
    assert_eq!(reply.get("id"), Some(&json!("sub-1")));

    for id in [&first_id, &second_id] {
        let (status, _) = server
            .post(&format!("/api/v1/mortgages/{id}/approve"), Some(server.owner), json!({}))
            .await;
        assert_eq!(status, 200);
    }

    let event = next_json(&mut ws).await;
    assert_eq!(event_type(&event), Some("mortgage_approved"));
    assert_eq!(
        event.get("payload").and_then(|p| p.get("mortgage_id")),
        Some(&json!(second_id))
    );
}

#[tokio::test]
async fn get_ledger_command_returns_summary() {
    let server = TestServer::spawn(RepaymentPolicy::BorrowerOnly).await;
    let mut ws = connect(&server).await;

    send(&mut ws, json!({ "command": "get_ledger" })).await;
    let reply = next_json(&mut ws).await;
    let payload = reply.get("payload");
    assert_eq!(
        payload.and_then(|p| p.get("total_lent")),
        Some(&json!("0"))
    );
    assert_eq!(
        payload.and_then(|p| p.get("owner")),
        Some(&json!(server.owner))
    );
}

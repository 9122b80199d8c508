//! Shared harness: spawns the gateway on an ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use loanpool_gateway::api;
use loanpool_gateway::app_state::AppState;
use loanpool_gateway::domain::{PartyId, RepaymentPolicy};
use serde_json::Value;

/// A running gateway plus an HTTP client pointed at it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub owner: PartyId,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn(policy: RepaymentPolicy) -> Self {
        let owner = PartyId::new();
        let state = AppState::in_memory(owner, policy, 256, true);
        let app = api::build_app(state, Duration::from_secs(5));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            owner,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let Ok(resp) = self.client.get(self.url(path)).send().await else {
            panic!("GET {path} failed");
        };
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    pub async fn post(&self, path: &str, caller: Option<PartyId>, body: Value) -> (u16, Value) {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(caller) = caller {
            request = request.header("x-caller-id", caller.to_string());
        }
        let Ok(resp) = request.send().await else {
            panic!("POST {path} failed");
        };
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }

    /// Creates a party holding `amount` via the faucet.
    pub async fn funded_party(&self, amount: u128) -> PartyId {
        let party = PartyId::new();
        let (status, _) = self
            .post(
                &format!("/api/v1/accounts/{party}/credit"),
                None,
                serde_json::json!({ "amount": amount.to_string() }),
            )
            .await;
        assert_eq!(status, 200);
        party
    }

    pub async fn balance(&self, party: PartyId) -> String {
        let (_, body) = self.get(&format!("/api/v1/accounts/{party}")).await;
        field(&body, "balance")
    }
}

/// Reads a string field from a JSON object, or `""`.
pub fn field(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Reads `error.code` from an error envelope.
pub fn error_code(body: &Value) -> u64 {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(Value::as_u64)
        .unwrap_or_default()
}

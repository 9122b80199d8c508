//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::api::dto::MortgageDto;
use crate::domain::{LedgerEvent, MortgageId};
use crate::service::LedgerService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<LedgerEvent>,
    ledger_service: Arc<LedgerService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();
    tracing::debug!("ws connection opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &ledger_service).await;
                        let Ok(json) = serde_json::to_string(&response) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(ledger_event) => {
                        if !subs.matches(ledger_event.mortgage_id()) {
                            continue;
                        }
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            serde_json::to_value(&ledger_event).unwrap_or_default(),
                        );
                        let json = serde_json::to_string(&msg).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Splits raw client text into a request id and a command. Accepts a bare
/// command object or a [`WsMessage`] envelope whose payload is the command.
fn parse_command(text: &str) -> Result<(String, WsCommand), WsMessage> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Err(WsMessage::error(String::new(), 400, "malformed JSON"));
    };

    let id = value
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    let body = match value.get("payload") {
        Some(payload) if payload.is_object() => payload.clone(),
        _ => value,
    };

    match serde_json::from_value::<WsCommand>(body) {
        Ok(command) => Ok((id, command)),
        Err(_) => Err(WsMessage::error(id, 404, "unknown command")),
    }
}

/// Splits a list of raw ids into parsed mortgage ids and the wildcard flag.
/// Unparseable ids are skipped.
fn parse_mortgage_ids(raw: &[String]) -> (Vec<MortgageId>, bool) {
    let mut wildcard = false;
    let mut ids = Vec::new();
    for s in raw {
        if s == "*" {
            wildcard = true;
        } else if let Ok(uuid) = s.parse::<uuid::Uuid>() {
            ids.push(MortgageId::from_uuid(uuid));
        }
    }
    (ids, wildcard)
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    ledger_service: &LedgerService,
) -> WsMessage {
    let (id, command) = match parse_command(text) {
        Ok(parsed) => parsed,
        Err(error) => return error,
    };

    match command {
        WsCommand::Subscribe { mortgage_ids } => {
            let (ids, wildcard) = parse_mortgage_ids(&mortgage_ids);
            subs.subscribe(&ids, wildcard);
            tracing::debug!(
                count = subs.count(),
                wildcard = subs.is_subscribed_all(),
                "ws subscribe"
            );
            WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { mortgage_ids } => {
            let (ids, wildcard) = parse_mortgage_ids(&mortgage_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::GetMortgage { mortgage_id } => {
            let Ok(uuid) = mortgage_id.parse::<uuid::Uuid>() else {
                return WsMessage::error(id, 400, "invalid mortgage id");
            };
            match ledger_service.get_mortgage(MortgageId::from_uuid(uuid)).await {
                Ok(mortgage) => WsMessage::new(
                    id,
                    WsMessageType::Response,
                    serde_json::to_value(MortgageDto::from(&mortgage)).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(id, e.error_code(), &e.to_string()),
            }
        }
        WsCommand::GetLedger => WsMessage::new(
            id,
            WsMessageType::Response,
            serde_json::to_value(ledger_service.summary().await).unwrap_or_default(),
        ),
    }
}

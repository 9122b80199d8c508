//! WebSocket message types: envelope and commands.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-originated message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error message with a numeric code.
    #[must_use]
    pub fn error(id: String, code: u32, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, either bare or as the
/// `payload` of a [`WsMessage`] envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow events for specific mortgages. `"*"` follows everything,
    /// including ledger-level events.
    Subscribe {
        /// Mortgage ids or `"*"`.
        mortgage_ids: Vec<String>,
    },
    /// Stop following mortgages. `"*"` clears the wildcard.
    Unsubscribe {
        /// Mortgage ids or `"*"`.
        mortgage_ids: Vec<String>,
    },
    /// Fetch a mortgage snapshot.
    GetMortgage {
        /// Target mortgage id.
        mortgage_id: String,
    },
    /// Fetch the ledger summary.
    GetLedger,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe_command() {
        let raw = r#"{"command":"subscribe","mortgage_ids":["*"]}"#;
        let Ok(WsCommand::Subscribe { mortgage_ids }) = serde_json::from_str(raw) else {
            panic!("expected subscribe");
        };
        assert_eq!(mortgage_ids, ["*"]);
    }

    #[test]
    fn parses_unit_command() {
        let raw = r#"{"command":"get_ledger"}"#;
        assert!(matches!(
            serde_json::from_str::<WsCommand>(raw),
            Ok(WsCommand::GetLedger)
        ));
    }

    #[test]
    fn error_message_carries_code() {
        let msg = WsMessage::error("req-1".to_string(), 400, "malformed JSON");
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload.get("code"), Some(&serde_json::json!(400)));
    }
}

//! Wire envelope shared by every session message (spec §4.7).

use serde::{Deserialize, Serialize};

/// The four message types a session can exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    New,
    Update,
    Snapshot,
    Error,
}

/// `{token, type, value}` — the only shape that crosses the wire.
///
/// `value` is deliberately untyped JSON: for `new`/`update` it holds one
/// item, for `snapshot` an array of items, for `error` a short string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub token: String,
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    pub value: serde_json::Value,
}

impl Message {
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            token: String::new(),
            msg_type: MessageType::Error,
            value: serde_json::Value::String(text.into()),
        }
    }

    pub fn snapshot(items: Vec<serde_json::Value>) -> Self {
        Self {
            token: String::new(),
            msg_type: MessageType::Snapshot,
            value: serde_json::Value::Array(items),
        }
    }

    pub fn update(item: serde_json::Value) -> Self {
        Self {
            token: String::new(),
            msg_type: MessageType::Update,
            value: item,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips() {
        let msg = Message::error("invalid token");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.msg_type, MessageType::Error);
    }

    #[test]
    fn missing_token_defaults_empty() {
        let raw = r#"{"type":"new","value":{}}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.token, "");
    }
}

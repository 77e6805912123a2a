// src/reload/message.rs

//! Reload message protocol.
//!
//! JSON messages sent over the WebSocket from the dev server to browser
//! clients:
//!
//! - `reload`: full page reload (scripts or HTML changed)
//! - `css`: re-fetch stylesheets in place, no page reload
//! - `error`: show the error overlay for a failed task
//! - `clear_error`: hide the overlay after a successful rebuild

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Full page reload.
    Reload,

    /// Stylesheets changed; swap them without reloading.
    Css,

    /// A pipeline task failed; display the overlay.
    Error { task: String, message: String },

    /// Previous failure resolved; hide the overlay.
    ClearError,
}

impl ReloadMessage {
    /// Serialize to JSON. Falls back to a plain reload on the (unreachable)
    /// serialization failure so clients never miss an update.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_round_trip_through_json() {
        let msg = ReloadMessage::Error {
            task: "styles".to_string(),
            message: "unexpected token".to_string(),
        };
        let json = msg.to_json();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""task":"styles""#));
        assert_eq!(ReloadMessage::from_json(&json), Some(msg));
    }

    #[test]
    fn unit_messages_use_the_type_tag() {
        assert_eq!(ReloadMessage::Reload.to_json(), r#"{"type":"reload"}"#);
        assert_eq!(ReloadMessage::Css.to_json(), r#"{"type":"css"}"#);
        assert_eq!(
            ReloadMessage::ClearError.to_json(),
            r#"{"type":"clear_error"}"#
        );
    }
}

//! The agent's typed output — what platform action to take.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Platform delivery options riding on a send/reply action.
///
/// Field set mirrors the platform's send-message API surface; everything
/// defaults off so a bare `{"action":"send","content":"hi"}` is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stickers: Vec<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub suppress_embeds: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<Value>,
    /// Deliver without triggering notifications.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub silent: bool,
}

/// Structured response dispatched after an invocation.
///
/// Closed set of actions with a forward-compatible default arm: a tag this
/// build does not know deserializes to [`StructuredResponse::Unknown`],
/// which the dispatcher logs and treats as a no-op instead of crashing the
/// handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StructuredResponse {
    /// Post a new message into the originating channel.
    Send {
        content: Option<String>,
        #[serde(flatten)]
        options: DeliveryOptions,
    },
    /// Post a reply referencing the originating message.
    Reply {
        content: Option<String>,
        #[serde(flatten)]
        options: DeliveryOptions,
    },
    /// Deliberately do nothing.
    Noop,
    #[serde(other)]
    Unknown,
}

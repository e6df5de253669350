//! SDK-independent snapshot of one platform message.
//!
//! The Discord adapter flattens the SDK's message object into this view
//! once, at the edge; routing predicates, conversation identity, and the
//! transcript adapter all operate on plain values and stay testable
//! without gateway fixtures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: u64,
    pub name: String,
    pub display_name: String,
    pub bot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAttachment {
    pub filename: String,
    pub url: String,
    pub size: u64,
    /// Declared media type, e.g. `image/png`. Absent for some uploads.
    pub content_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MessageAttachment {
    /// Whether the declared media type marks this attachment as an image.
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    /// Channel the message was delivered in. For thread messages this is
    /// the thread itself, so replies and tool defaults land where the
    /// conversation is actually happening.
    pub channel_id: u64,
    /// Absent for direct/private conversations.
    pub guild_id: Option<u64>,
    /// Parent text channel when the message was delivered in a thread.
    pub parent_id: Option<u64>,
    pub author: MessageAuthor,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<MessageAttachment>,
    /// Whether the bot's own identity appears in the mention list.
    #[serde(default)]
    pub mentions_self: bool,
    /// Whether this message replies to one of the bot's own messages.
    #[serde(default)]
    pub replies_to_self: bool,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
}

//! Conversation identity — the stable key the agent runtime uses for
//! memory/session continuity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::ChatMessage;

/// Stable identity of a logical conversation.
///
/// A pure function of the message's scope: private conversations key on
/// the author, guild conversations on the channel (plus the thread when
/// there is one). Equivalent input always renders the identical string;
/// distinct channels never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn from_message(message: &ChatMessage) -> Self {
        let key = match (message.guild_id, message.parent_id) {
            (None, _) => format!("guild/__private__/channel/{}", message.author.id),
            (Some(guild), None) => {
                format!("guild/{}/channel/{}", guild, message.channel_id)
            }
            // In a thread the delivery channel IS the thread; the parent
            // text channel anchors the key so the thread nests under it.
            (Some(guild), Some(parent)) => format!(
                "guild/{}/channel/{}/thread/{}",
                guild, parent, message.channel_id
            ),
        };
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flat identifier map handed to the agent runtime alongside the
/// transcript, so the runtime and its tools can address the originating
/// context without being re-passed the platform objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationScope {
    pub thread_id: ConversationId,
    pub message_id: u64,
    pub channel_id: u64,
    pub user_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<u64>,
}

impl InvocationScope {
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            thread_id: ConversationId::from_message(message),
            message_id: message.id,
            channel_id: message.channel_id,
            user_id: message.author.id,
            guild_id: message.guild_id,
        }
    }

    /// Render as the wire-level `configurable` map.
    pub fn to_map(&self) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        map.insert(
            "thread_id".to_string(),
            Value::String(self.thread_id.as_str().to_string()),
        );
        map.insert("message_id".to_string(), Value::from(self.message_id));
        map.insert("channel_id".to_string(), Value::from(self.channel_id));
        map.insert("user_id".to_string(), Value::from(self.user_id));
        if let Some(guild_id) = self.guild_id {
            map.insert("guild_id".to_string(), Value::from(guild_id));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageAuthor;
    use chrono::Utc;

    fn message(guild: Option<u64>, channel: u64, parent: Option<u64>, author: u64) -> ChatMessage {
        ChatMessage {
            id: 1000,
            channel_id: channel,
            guild_id: guild,
            parent_id: parent,
            author: MessageAuthor {
                id: author,
                name: "someone".to_string(),
                display_name: String::new(),
                bot: false,
            },
            content: "hello".to_string(),
            attachments: Vec::new(),
            mentions_self: false,
            replies_to_self: false,
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    #[test]
    fn private_scope_keys_on_author() {
        let id = ConversationId::from_message(&message(None, 7, None, 42));
        assert_eq!(id.as_str(), "guild/__private__/channel/42");
    }

    #[test]
    fn guild_scope_keys_on_channel() {
        let id = ConversationId::from_message(&message(Some(5), 7, None, 42));
        assert_eq!(id.as_str(), "guild/5/channel/7");
    }

    #[test]
    fn thread_scope_nests_under_parent_channel() {
        // Delivered in thread 9, whose parent text channel is 7.
        let id = ConversationId::from_message(&message(Some(5), 9, Some(7), 42));
        assert_eq!(id.as_str(), "guild/5/channel/7/thread/9");
    }

    #[test]
    fn thread_scope_keeps_delivery_channel_in_scope() {
        // Tool defaults and replies must target the thread itself, not
        // its parent channel.
        let scope = InvocationScope::from_message(&message(Some(5), 9, Some(7), 42));
        assert_eq!(scope.channel_id, 9);
        assert_eq!(scope.thread_id.as_str(), "guild/5/channel/7/thread/9");
    }

    #[test]
    fn identity_is_pure() {
        let a = ConversationId::from_message(&message(Some(5), 7, None, 42));
        let b = ConversationId::from_message(&message(Some(5), 7, None, 43));
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn distinct_channels_never_collide() {
        let a = ConversationId::from_message(&message(Some(5), 7, None, 42));
        let b = ConversationId::from_message(&message(Some(5), 8, None, 42));
        assert_ne!(a, b);
    }

    #[test]
    fn scope_map_includes_guild_only_when_present() {
        let scope = InvocationScope::from_message(&message(Some(5), 7, None, 42));
        let map = scope.to_map();
        assert_eq!(map["guild_id"], serde_json::json!(5));
        assert_eq!(map["thread_id"], serde_json::json!("guild/5/channel/7"));

        let dm = InvocationScope::from_message(&message(None, 7, None, 42));
        assert!(!dm.to_map().contains_key("guild_id"));
    }
}

//! Transcript turns — the model-consumable form of a conversation.
//!
//! A turn is either bare text or an ordered list of typed content blocks
//! (the shape the agent runtime's message schema expects). The builder
//! collapses runs of consecutive assistant messages into one logical turn
//! so the model sees bot output as contiguous.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One typed content block inside a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ImageUrl { image_url: String },
}

/// Turn content: plain text for the common case, blocks when a message
/// carries images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl TurnContent {
    /// Promote bare text to a single-element block list.
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        match self {
            TurnContent::Text(text) => vec![ContentBlock::Text { text }],
            TurnContent::Blocks(blocks) => blocks,
        }
    }

    /// True when there is nothing a model could read: empty text, or an
    /// empty block list.
    pub fn is_empty(&self) -> bool {
        match self {
            TurnContent::Text(text) => text.is_empty(),
            TurnContent::Blocks(blocks) => blocks.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub content: TurnContent,
}

impl TranscriptTurn {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: TurnContent::Text(text.into()),
        }
    }

    /// Convert one platform message into exactly one turn.
    ///
    /// Image attachments become image-reference blocks carrying their
    /// retrieval URL. When any were produced, the message text follows as
    /// a trailing text block — but only if there is text; an image-only
    /// message yields just the image blocks. Without images the content is
    /// the plain text form (possibly empty — the builder tolerates that).
    pub fn from_message(message: &ChatMessage) -> Self {
        let role = if message.author.bot {
            Role::Assistant
        } else {
            Role::User
        };

        let mut blocks: Vec<ContentBlock> = message
            .attachments
            .iter()
            .filter(|a| a.is_image())
            .map(|a| ContentBlock::ImageUrl {
                image_url: a.url.clone(),
            })
            .collect();

        let content = if blocks.is_empty() {
            TurnContent::Text(message.content.clone())
        } else {
            if !message.content.is_empty() {
                blocks.push(ContentBlock::Text {
                    text: message.content.clone(),
                });
            }
            TurnContent::Blocks(blocks)
        };

        Self { role, content }
    }
}

/// Builds a chronological transcript from messages delivered newest-first.
///
/// Exclusively owned per invocation — there is no shared aggregator state
/// to clear between conversations.
#[derive(Debug, Default)]
pub struct TranscriptBuilder {
    turns: Vec<TranscriptTurn>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, merging consecutive assistant turns into one.
    ///
    /// Only assistant turns merge; adjacent user turns stay separate even
    /// when they share an author. Merging concatenates block lists, with
    /// bare text promoted to a text block first. Because input arrives
    /// newest-first, the incoming (older) turn's blocks are placed ahead of
    /// the already-accumulated ones, keeping the merged content
    /// chronological.
    pub fn push(&mut self, turn: TranscriptTurn) {
        if turn.role == Role::Assistant {
            if let Some(last) = self.turns.last_mut() {
                if last.role == Role::Assistant {
                    let newer = std::mem::replace(
                        &mut last.content,
                        TurnContent::Blocks(Vec::new()),
                    )
                    .into_blocks();
                    let mut blocks = turn.content.into_blocks();
                    blocks.extend(newer);
                    last.content = TurnContent::Blocks(blocks);
                    return;
                }
            }
        }
        self.turns.push(turn);
    }

    pub fn push_message(&mut self, message: &ChatMessage) {
        self.push(TranscriptTurn::from_message(message));
    }

    /// Reverse into chronological (oldest-first) order and return the turns.
    pub fn finish(mut self) -> Vec<TranscriptTurn> {
        self.turns.reverse();
        self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageAttachment, MessageAuthor};
    use chrono::Utc;

    fn author(bot: bool) -> MessageAuthor {
        MessageAuthor {
            id: if bot { 1 } else { 2 },
            name: if bot { "bot" } else { "user" }.to_string(),
            display_name: String::new(),
            bot,
        }
    }

    fn msg(bot: bool, content: &str) -> ChatMessage {
        ChatMessage {
            id: 10,
            channel_id: 20,
            guild_id: Some(30),
            parent_id: None,
            author: author(bot),
            content: content.to_string(),
            attachments: Vec::new(),
            mentions_self: false,
            replies_to_self: false,
            created_at: Utc::now(),
            edited_at: None,
        }
    }

    fn image(url: &str) -> MessageAttachment {
        MessageAttachment {
            filename: "pic.png".to_string(),
            url: url.to_string(),
            size: 512,
            content_type: Some("image/png".to_string()),
            width: Some(64),
            height: Some(64),
        }
    }

    #[test]
    fn bot_message_is_assistant_turn() {
        let turn = TranscriptTurn::from_message(&msg(true, "hello"));
        assert_eq!(turn.role, Role::Assistant);
        assert_eq!(turn.content, TurnContent::Text("hello".to_string()));
    }

    #[test]
    fn image_only_message_has_no_trailing_text_block() {
        let mut m = msg(false, "");
        m.attachments.push(image("https://cdn/pic.png"));
        let turn = TranscriptTurn::from_message(&m);
        assert_eq!(
            turn.content,
            TurnContent::Blocks(vec![ContentBlock::ImageUrl {
                image_url: "https://cdn/pic.png".to_string()
            }])
        );
    }

    #[test]
    fn image_with_text_appends_trailing_text_block() {
        let mut m = msg(false, "look at this");
        m.attachments.push(image("https://cdn/pic.png"));
        let turn = TranscriptTurn::from_message(&m);
        assert_eq!(
            turn.content,
            TurnContent::Blocks(vec![
                ContentBlock::ImageUrl {
                    image_url: "https://cdn/pic.png".to_string()
                },
                ContentBlock::Text {
                    text: "look at this".to_string()
                },
            ])
        );
    }

    #[test]
    fn non_image_attachments_are_ignored() {
        let mut m = msg(false, "a file");
        m.attachments.push(MessageAttachment {
            filename: "notes.pdf".to_string(),
            url: "https://cdn/notes.pdf".to_string(),
            size: 2048,
            content_type: Some("application/pdf".to_string()),
            width: None,
            height: None,
        });
        let turn = TranscriptTurn::from_message(&m);
        assert_eq!(turn.content, TurnContent::Text("a file".to_string()));
    }

    #[test]
    fn consecutive_assistant_turns_merge_in_order() {
        // Delivery order is newest-first: user last-sent arrives first.
        let mut builder = TranscriptBuilder::new();
        builder.push_message(&msg(false, "hi"));
        builder.push_message(&msg(true, "c"));
        builder.push_message(&msg(true, "b"));
        builder.push_message(&msg(true, "a"));
        let turns = builder.finish();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::Assistant);
        // Merged content reads in send order even though delivery was
        // newest-first.
        assert_eq!(
            turns[0].content,
            TurnContent::Blocks(vec![
                ContentBlock::Text { text: "a".into() },
                ContentBlock::Text { text: "b".into() },
                ContentBlock::Text { text: "c".into() },
            ])
        );
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].content, TurnContent::Text("hi".to_string()));
    }

    #[test]
    fn user_turns_never_merge() {
        let mut builder = TranscriptBuilder::new();
        builder.push_message(&msg(false, "second"));
        builder.push_message(&msg(false, "first"));
        let turns = builder.finish();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, TurnContent::Text("first".to_string()));
        assert_eq!(turns[1].content, TurnContent::Text("second".to_string()));
    }

    #[test]
    fn assistant_first_turn_does_not_merge_into_nothing() {
        let mut builder = TranscriptBuilder::new();
        builder.push_message(&msg(true, "solo"));
        let turns = builder.finish();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
    }

    #[test]
    fn empty_input_yields_empty_transcript() {
        assert!(TranscriptBuilder::new().finish().is_empty());
    }

    #[test]
    fn turn_serializes_to_wire_shape() {
        let turn = TranscriptTurn {
            role: Role::User,
            content: TurnContent::Blocks(vec![ContentBlock::ImageUrl {
                image_url: "https://cdn/p.png".to_string(),
            }]),
        };
        let value = serde_json::to_value(&turn).expect("serializes");
        assert_eq!(
            value,
            serde_json::json!({
                "role": "user",
                "content": [{ "type": "image_url", "image_url": "https://cdn/p.png" }]
            })
        );
    }
}

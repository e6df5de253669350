use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use apeiron_agent::{DeliveryOptions, Tool, ToolResult};
use apeiron_core::InvocationScope;

use crate::dispatch;
use crate::send;
use crate::tools::{classify, parse_args, Failure, Snowflake};

/// Post a message to a channel, with the full delivery-option surface.
pub struct SendMessageTool {
    http: Arc<Http>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SendMessageArgs {
    content: Option<String>,
    channel_id: Option<Snowflake>,
    /// Message id to reply to.
    reference: Option<Snowflake>,
    tts: bool,
    embeds: Vec<Value>,
    stickers: Vec<u64>,
    suppress_embeds: bool,
    allowed_mentions: Option<Value>,
    silent: bool,
}

impl SendMessageTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for SendMessageTool {
    fn name(&self) -> &str {
        "send_message"
    }

    fn description(&self) -> &str {
        "Send a message to a channel. Defaults to the channel the \
         conversation is happening in. Long content is split across \
         multiple messages automatically."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The content of the message to send"
                },
                "channel_id": {
                    "type": "integer",
                    "description": "ID of the channel to send the message to"
                },
                "reference": {
                    "type": "integer",
                    "description": "Message ID to reply to"
                },
                "tts": {
                    "type": "boolean",
                    "description": "Whether to send as text-to-speech message"
                },
                "embeds": {
                    "type": "array",
                    "items": { "type": "object" },
                    "description": "List of embed objects"
                },
                "stickers": {
                    "type": "array",
                    "items": { "type": "integer" },
                    "description": "List of sticker IDs to send"
                },
                "suppress_embeds": {
                    "type": "boolean",
                    "description": "Whether to suppress embeds in this message"
                },
                "allowed_mentions": {
                    "type": "object",
                    "description": "Controls which mentions are allowed in the message"
                },
                "silent": {
                    "type": "boolean",
                    "description": "Whether to send without triggering notifications"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: SendMessageArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let channel_id = ChannelId::new(
            args.channel_id
                .map(Snowflake::get)
                .unwrap_or(scope.channel_id),
        );
        let content = args.content.unwrap_or_default();
        if content.is_empty() && args.embeds.is_empty() && args.stickers.is_empty() {
            return ToolResult::error("Nothing to send: no content, embeds or stickers");
        }

        let options = DeliveryOptions {
            tts: args.tts,
            embeds: args.embeds,
            stickers: args.stickers,
            suppress_embeds: args.suppress_embeds,
            allowed_mentions: args.allowed_mentions,
            silent: args.silent,
        };
        let mut first = dispatch::apply_options(CreateMessage::new(), &options);
        if let Some(reference) = args.reference {
            first = first.reference_message((channel_id, MessageId::new(reference.get())));
        }

        match send::send_chunked(&self.http, channel_id, &content, first).await {
            Ok(message) => {
                ToolResult::success(format!("Message sent successfully with ID: {}", message.id))
            }
            Err(err) => match classify(&err) {
                Failure::NotFound => {
                    ToolResult::error(format!("Failed to send message: channel {channel_id} not found"))
                }
                Failure::Forbidden => {
                    ToolResult::error(format!("Failed to send message: cannot post in channel {channel_id}"))
                }
                Failure::Other => ToolResult::error(format!("Failed to send message: {err}")),
            },
        }
    }
}

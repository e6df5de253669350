use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::http::Http;
use serenity::model::channel::ReactionType;
use serenity::model::id::{ChannelId, MessageId};

use apeiron_agent::{Tool, ToolResult};
use apeiron_core::InvocationScope;

use crate::tools::{classify, parse_args, Failure, Snowflake};

/// React to a message with a unicode or custom emoji.
pub struct AddReactionTool {
    http: Arc<Http>,
}

#[derive(Debug, Deserialize)]
struct AddReactionArgs {
    emoji: String,
    #[serde(default)]
    message_id: Option<Snowflake>,
    #[serde(default)]
    channel_id: Option<Snowflake>,
}

impl AddReactionTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for AddReactionTool {
    fn name(&self) -> &str {
        "add_reaction"
    }

    fn description(&self) -> &str {
        "Add an emoji reaction to a message. Defaults to the message that \
         triggered this conversation turn. Custom emoji use the \
         <:name:id> form."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "emoji": {
                    "type": "string",
                    "description": "The emoji to react with"
                },
                "message_id": {
                    "type": "integer",
                    "description": "ID of the message to add reaction to"
                },
                "channel_id": {
                    "type": "integer",
                    "description": "ID of the channel containing the message"
                }
            },
            "required": ["emoji"]
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: AddReactionArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let channel_id = ChannelId::new(
            args.channel_id
                .map(Snowflake::get)
                .unwrap_or(scope.channel_id),
        );
        let message_id = MessageId::new(
            args.message_id
                .map(Snowflake::get)
                .unwrap_or(scope.message_id),
        );

        let reaction = match ReactionType::try_from(args.emoji.as_str()) {
            Ok(reaction) => reaction,
            Err(_) => return ToolResult::error(format!("Invalid emoji: {}", args.emoji)),
        };

        match self
            .http
            .create_reaction(channel_id, message_id, &reaction)
            .await
        {
            Ok(()) => ToolResult::success(format!(
                "Reaction {} added successfully to message {}",
                args.emoji, message_id
            )),
            Err(err) => match classify(&err) {
                Failure::NotFound => {
                    ToolResult::success(format!("Message {message_id} not found"))
                }
                Failure::Forbidden => ToolResult::success(format!(
                    "Failed to add reaction: no access to message {message_id}"
                )),
                Failure::Other => {
                    ToolResult::error(format!("Failed to add reaction: {err}"))
                }
            },
        }
    }
}

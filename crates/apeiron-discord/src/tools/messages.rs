use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use apeiron_agent::{Tool, ToolResult};
use apeiron_core::InvocationScope;

use crate::render;
use crate::tools::{classify, parse_args, Failure, Snowflake};

/// Retrieve a single message by id.
pub struct GetMessageTool {
    http: Arc<Http>,
}

#[derive(Debug, Deserialize)]
struct GetMessageArgs {
    message_id: Snowflake,
    #[serde(default)]
    channel_id: Option<Snowflake>,
}

impl GetMessageTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for GetMessageTool {
    fn name(&self) -> &str {
        "get_message"
    }

    fn description(&self) -> &str {
        "Get a specific message by ID. The channel defaults to the one the \
         conversation is happening in."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message_id": {
                    "type": "integer",
                    "description": "The ID of the message to retrieve"
                },
                "channel_id": {
                    "type": "integer",
                    "description": "The ID of the channel containing the message"
                }
            },
            "required": ["message_id"]
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: GetMessageArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let channel_id = ChannelId::new(
            args.channel_id
                .map(Snowflake::get)
                .unwrap_or(scope.channel_id),
        );
        let message_id = MessageId::new(args.message_id.get());

        match channel_id.message(&self.http, message_id).await {
            Ok(message) => ToolResult::json(&render::message_to_value(&message)),
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!(
                    "Message {message_id} not found in channel {channel_id}"
                )),
                Failure::Forbidden => ToolResult::success(format!(
                    "Cannot access message {message_id} in channel {channel_id}"
                )),
                Failure::Other => ToolResult::error(format!("Failed to get message: {err}")),
            },
        }
    }
}

/// Read a page of channel history with optional position filters.
pub struct ListMessagesTool {
    http: Arc<Http>,
}

#[derive(Debug, Deserialize)]
struct ListMessagesArgs {
    #[serde(default)]
    channel_id: Option<Snowflake>,
    #[serde(default)]
    before: Option<Snowflake>,
    #[serde(default)]
    after: Option<Snowflake>,
    #[serde(default)]
    around: Option<Snowflake>,
    #[serde(default = "default_page")]
    limit: u8,
}

fn default_page() -> u8 {
    100
}

impl ListMessagesTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for ListMessagesTool {
    fn name(&self) -> &str {
        "list_messages"
    }

    fn description(&self) -> &str {
        "Read messages from a channel, newest first. Supports before, \
         after and around message-ID filters; at most 100 per call."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "integer",
                    "description": "ID of the channel to read messages from"
                },
                "before": {
                    "type": "integer",
                    "description": "Optional message ID to read messages before"
                },
                "after": {
                    "type": "integer",
                    "description": "Optional message ID to read messages after"
                },
                "around": {
                    "type": "integer",
                    "description": "Optional message ID to read messages around"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of messages to retrieve (max 100)"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: ListMessagesArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let channel_id = ChannelId::new(
            args.channel_id
                .map(Snowflake::get)
                .unwrap_or(scope.channel_id),
        );

        let mut request = GetMessages::new().limit(args.limit.min(100));
        if let Some(before) = args.before {
            request = request.before(MessageId::new(before.get()));
        }
        if let Some(after) = args.after {
            request = request.after(MessageId::new(after.get()));
        }
        if let Some(around) = args.around {
            request = request.around(MessageId::new(around.get()));
        }

        match channel_id.messages(&self.http, request).await {
            Ok(messages) => {
                let page: Vec<Value> = messages.iter().map(render::message_to_value).collect();
                ToolResult::json(&Value::Array(page))
            }
            Err(err) => match classify(&err) {
                Failure::NotFound => {
                    ToolResult::success(format!("Channel {channel_id} not found"))
                }
                Failure::Forbidden => ToolResult::success(format!(
                    "Failed to read messages: no access to channel {channel_id}"
                )),
                Failure::Other => ToolResult::error(format!("Failed to read messages: {err}")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> InvocationScope {
        serde_json::from_value(json!({
            "thread_id": "guild/5/channel/7",
            "message_id": 1000,
            "channel_id": 7,
            "user_id": 42,
            "guild_id": 5,
        }))
        .expect("scope deserializes")
    }

    #[tokio::test]
    async fn zero_channel_id_argument_yields_error_result() {
        // A zero id is schema-valid JSON but would panic inside
        // serenity's id constructors; it must surface as a tool error.
        let tool = GetMessageTool::new(Arc::new(Http::new("")));
        let result = tool
            .execute(json!({ "message_id": 5, "channel_id": 0 }), &scope())
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("Invalid tool arguments"));
    }

    #[tokio::test]
    async fn zero_message_id_argument_yields_error_result() {
        let tool = GetMessageTool::new(Arc::new(Http::new("")));
        let result = tool
            .execute(json!({ "message_id": 0, "channel_id": 7 }), &scope())
            .await;
        assert!(result.is_error);
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::http::Http;
use serenity::model::channel::{Channel, ChannelType};
use serenity::model::id::{ChannelId, GuildId};

use apeiron_agent::{Tool, ToolResult};
use apeiron_core::InvocationScope;

use crate::render;
use crate::tools::{classify, parse_args, Failure, Snowflake};

/// Retrieve one text channel's metadata.
pub struct GetChannelTool {
    http: Arc<Http>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetChannelArgs {
    channel_id: Option<Snowflake>,
}

impl GetChannelTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for GetChannelTool {
    fn name(&self) -> &str {
        "get_channel"
    }

    fn description(&self) -> &str {
        "Get text channel information. Defaults to the channel the \
         conversation is happening in."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "integer",
                    "description": "The ID of the channel to retrieve"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: GetChannelArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let channel_id = ChannelId::new(
            args.channel_id
                .map(Snowflake::get)
                .unwrap_or(scope.channel_id),
        );

        match channel_id.to_channel(&self.http).await {
            Ok(Channel::Guild(channel))
                if matches!(channel.kind, ChannelType::Text | ChannelType::News) =>
            {
                ToolResult::json(&render::channel_to_value(&channel))
            }
            Ok(_) => ToolResult::success(format!(
                "Channel {channel_id} not found or not a text channel"
            )),
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!(
                    "Channel {channel_id} not found or not a text channel"
                )),
                Failure::Forbidden => {
                    ToolResult::success(format!("Failed to get channel: no access to {channel_id}"))
                }
                Failure::Other => ToolResult::error(format!("Failed to get channel: {err}")),
            },
        }
    }
}

/// List a guild's channels.
pub struct ListChannelsTool {
    http: Arc<Http>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListChannelsArgs {
    guild_id: Option<Snowflake>,
}

impl ListChannelsTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for ListChannelsTool {
    fn name(&self) -> &str {
        "list_channels"
    }

    fn description(&self) -> &str {
        "List channels in a guild. Defaults to the guild the conversation \
         is happening in."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "guild_id": {
                    "type": "integer",
                    "description": "Discord guild (server) ID to list channels from"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: ListChannelsArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let Some(guild_id) = args.guild_id.map(Snowflake::get).or(scope.guild_id) else {
            return ToolResult::success("No guild in scope: this is a private conversation");
        };

        match GuildId::new(guild_id).channels(&self.http).await {
            Ok(channels) => {
                let mut channels: Vec<_> = channels.into_values().collect();
                channels.sort_by_key(|c| c.position);
                let page: Vec<Value> = channels.iter().map(render::channel_to_value).collect();
                ToolResult::json(&Value::Array(page))
            }
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!("Guild {guild_id} not found")),
                Failure::Forbidden => ToolResult::success(format!(
                    "Failed to list channels: no access to guild {guild_id}"
                )),
                Failure::Other => ToolResult::error(format!("Failed to list channels: {err}")),
            },
        }
    }
}

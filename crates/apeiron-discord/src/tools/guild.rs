use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::http::Http;
use serenity::model::id::{EmojiId, GuildId};

use apeiron_agent::{Tool, ToolResult};
use apeiron_core::InvocationScope;

use crate::render;
use crate::tools::{classify, parse_args, Failure, Snowflake};

/// Retrieve guild metadata, including the full role list.
pub struct GetGuildTool {
    http: Arc<Http>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetGuildArgs {
    guild_id: Option<Snowflake>,
}

impl GetGuildTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for GetGuildTool {
    fn name(&self) -> &str {
        "get_guild"
    }

    fn description(&self) -> &str {
        "Get guild (server) information, including its roles. Defaults to \
         the guild the conversation is happening in."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "guild_id": {
                    "type": "integer",
                    "description": "Discord guild (server) ID to look up"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: GetGuildArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let Some(guild_id) = args.guild_id.map(Snowflake::get).or(scope.guild_id) else {
            return ToolResult::success("No guild in scope: this is a private conversation");
        };

        match GuildId::new(guild_id)
            .to_partial_guild_with_counts(&self.http)
            .await
        {
            Ok(guild) => ToolResult::json(&render::guild_to_value(&guild)),
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!("Guild {guild_id} not found")),
                Failure::Forbidden => {
                    ToolResult::success(format!("Failed to get guild: no access to {guild_id}"))
                }
                Failure::Other => ToolResult::error(format!("Failed to get guild: {err}")),
            },
        }
    }
}

/// Retrieve one custom emoji from a guild.
pub struct GetEmojiTool {
    http: Arc<Http>,
}

#[derive(Debug, Deserialize)]
struct GetEmojiArgs {
    emoji_id: Snowflake,
    #[serde(default)]
    guild_id: Option<Snowflake>,
}

impl GetEmojiTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for GetEmojiTool {
    fn name(&self) -> &str {
        "get_emoji"
    }

    fn description(&self) -> &str {
        "Get a custom emoji by ID. The guild defaults to the one the \
         conversation is happening in."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "emoji_id": {
                    "type": "integer",
                    "description": "The ID of the emoji to retrieve"
                },
                "guild_id": {
                    "type": "integer",
                    "description": "The ID of the guild containing the emoji"
                }
            },
            "required": ["emoji_id"]
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: GetEmojiArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let Some(guild_id) = args.guild_id.map(Snowflake::get).or(scope.guild_id) else {
            return ToolResult::success("No guild in scope: this is a private conversation");
        };
        let emoji_id = EmojiId::new(args.emoji_id.get());

        match GuildId::new(guild_id).emoji(&self.http, emoji_id).await {
            Ok(emoji) => ToolResult::json(&render::emoji_to_value(&emoji, guild_id)),
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!(
                    "Emoji {emoji_id} not found in guild {guild_id}"
                )),
                Failure::Forbidden => {
                    ToolResult::success(format!("Failed to get emoji: no access to guild {guild_id}"))
                }
                Failure::Other => ToolResult::error(format!("Failed to get emoji: {err}")),
            },
        }
    }
}

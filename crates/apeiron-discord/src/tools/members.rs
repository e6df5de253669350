use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::http::Http;
use serenity::model::id::{GuildId, UserId};

use apeiron_agent::{Tool, ToolResult};
use apeiron_core::InvocationScope;

use crate::render;
use crate::tools::{classify, parse_args, Failure, Snowflake};

/// Retrieve a user's profile.
pub struct GetUserTool {
    http: Arc<Http>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GetUserArgs {
    user_id: Option<Snowflake>,
}

impl GetUserTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for GetUserTool {
    fn name(&self) -> &str {
        "get_user"
    }

    fn description(&self) -> &str {
        "Get user profile information. Defaults to the user who sent the \
         message being handled."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_id": {
                    "type": "integer",
                    "description": "Discord user ID to look up"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: GetUserArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let user_id = UserId::new(args.user_id.map(Snowflake::get).unwrap_or(scope.user_id));

        match user_id.to_user(&self.http).await {
            Ok(user) => ToolResult::json(&render::user_to_value(&user)),
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!("User {user_id} not found")),
                Failure::Forbidden => {
                    ToolResult::success(format!("Failed to get user: no access to {user_id}"))
                }
                Failure::Other => ToolResult::error(format!("Failed to get user: {err}")),
            },
        }
    }
}

/// List a guild's members, paged by user id.
pub struct ListMembersTool {
    http: Arc<Http>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListMembersArgs {
    guild_id: Option<Snowflake>,
    /// User id to continue listing after.
    after: Option<Snowflake>,
    limit: u64,
}

impl Default for ListMembersArgs {
    fn default() -> Self {
        Self {
            guild_id: None,
            after: None,
            limit: 100,
        }
    }
}

impl ListMembersTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for ListMembersTool {
    fn name(&self) -> &str {
        "list_members"
    }

    fn description(&self) -> &str {
        "List members in a guild, ordered by user ID. Use the after \
         parameter to page; at most 1000 per call."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "guild_id": {
                    "type": "integer",
                    "description": "Discord guild (server) ID to list members from"
                },
                "after": {
                    "type": "integer",
                    "description": "Optional user ID to list members after"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of members to retrieve (max 1000)"
                }
            }
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: ListMembersArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let Some(guild_id) = args.guild_id.map(Snowflake::get).or(scope.guild_id) else {
            return ToolResult::success("No guild in scope: this is a private conversation");
        };
        let after = args.after.map(|id| UserId::new(id.get()));

        match GuildId::new(guild_id)
            .members(&self.http, Some(args.limit.min(1000)), after)
            .await
        {
            Ok(members) => {
                let page: Vec<Value> = members.iter().map(render::member_to_value).collect();
                ToolResult::json(&Value::Array(page))
            }
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!("Guild {guild_id} not found")),
                Failure::Forbidden => ToolResult::success(format!(
                    "Failed to list members: no access to guild {guild_id}"
                )),
                Failure::Other => ToolResult::error(format!("Failed to list members: {err}")),
            },
        }
    }
}

/// Search a guild's members by name prefix.
pub struct SearchMembersTool {
    http: Arc<Http>,
}

#[derive(Debug, Deserialize)]
struct SearchMembersArgs {
    query: String,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    #[serde(default = "default_search_limit")]
    limit: u64,
}

fn default_search_limit() -> u64 {
    100
}

impl SearchMembersTool {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Tool for SearchMembersTool {
    fn name(&self) -> &str {
        "search_members"
    }

    fn description(&self) -> &str {
        "Search guild members whose username or nickname starts with the \
         query, case-insensitively."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to filter members by (case-insensitive)"
                },
                "guild_id": {
                    "type": "integer",
                    "description": "Discord guild (server) ID to search members in"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of members to retrieve (max 1000)"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value, scope: &InvocationScope) -> ToolResult {
        let args: SearchMembersArgs = match parse_args(input) {
            Ok(args) => args,
            Err(result) => return result,
        };

        let Some(guild_id) = args.guild_id.map(Snowflake::get).or(scope.guild_id) else {
            return ToolResult::success("No guild in scope: this is a private conversation");
        };

        match GuildId::new(guild_id)
            .search_members(&self.http, &args.query, Some(args.limit.min(1000)))
            .await
        {
            Ok(members) => {
                let page: Vec<Value> = members.iter().map(render::member_to_value).collect();
                ToolResult::json(&Value::Array(page))
            }
            Err(err) => match classify(&err) {
                Failure::NotFound => ToolResult::success(format!("Guild {guild_id} not found")),
                Failure::Forbidden => ToolResult::success(format!(
                    "Failed to search members: no access to guild {guild_id}"
                )),
                Failure::Other => ToolResult::error(format!("Failed to search members: {err}")),
            },
        }
    }
}

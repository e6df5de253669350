//! Tool boundary — capabilities the bot lends to the agent runtime.
//!
//! The runtime owns the reasoning loop; tools execute here, on the client
//! side, because they need the bot's own platform connection. Failures are
//! reported back as error results, never raised through the loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use apeiron_core::InvocationScope;

/// Result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Text content returned to the agent.
    pub content: String,
    /// Whether the tool execution failed.
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
        }
    }

    /// Serialize a JSON payload as a successful result.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::success(value.to_string())
    }
}

/// Tool definition advertised to the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A tool call requested by the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

/// Executed-call payload posted back when resuming a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub call_id: String,
    pub content: String,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn from_result(call: &ToolCall, result: ToolResult) -> Self {
        Self {
            call_id: call.id.clone(),
            content: result.content,
            is_error: result.is_error,
        }
    }
}

/// Trait that all tools implement.
///
/// `scope` carries the originating conversation's identifiers; tools fall
/// back to them when the agent omits an explicit target (e.g. a
/// `send_message` without a `channel_id` goes to the originating channel).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name for this tool (e.g. "send_message").
    fn name(&self) -> &str;
    /// Human-readable description of what this tool does.
    fn description(&self) -> &str;
    /// JSON Schema for the tool's input parameters.
    fn input_schema(&self) -> serde_json::Value;
    /// Execute the tool with the given input.
    async fn execute(&self, input: serde_json::Value, scope: &InvocationScope) -> ToolResult;
}

/// Convert a slice of tools to advertised definitions.
pub fn to_definitions(tools: &[Box<dyn Tool>]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|t| ToolDefinition {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect()
}

//! The agent-graph boundary.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use apeiron_core::TranscriptTurn;

use crate::tool::{ToolCall, ToolDefinition, ToolOutput};

/// One invocation request: the transcript plus the conversation's
/// identifier map and the tools on offer.
#[derive(Debug, Clone)]
pub struct GraphRequest {
    /// Which agent variant to run (e.g. `operator-6o`).
    pub assistant: String,
    pub input: Vec<TranscriptTurn>,
    /// Flat `configurable` map: thread_id, message_id, channel_id,
    /// user_id, and guild_id when present.
    pub configurable: HashMap<String, Value>,
    pub tools: Vec<ToolDefinition>,
}

/// What the runtime handed back for one round.
#[derive(Debug, Clone)]
pub enum GraphTurn {
    /// The run completed with a structured response.
    Finished(crate::response::StructuredResponse),
    /// The run is parked waiting for client-side tool results.
    ToolUse {
        run_id: String,
        calls: Vec<ToolCall>,
    },
}

/// Opaque interface over the hosted agent runtime.
///
/// `start` opens a run; while the runtime requests tools, the caller
/// executes them and feeds results back through `resume` until the run
/// finishes.
#[async_trait]
pub trait AgentGraph: Send + Sync {
    /// Runtime name for logging.
    fn name(&self) -> &str;

    async fn start(&self, request: GraphRequest) -> Result<GraphTurn, AgentError>;

    async fn resume(&self, run_id: &str, outputs: Vec<ToolOutput>) -> Result<GraphTurn, AgentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("runtime error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("runtime unavailable: {0}")]
    Unavailable(String),

    #[error("tool round-trips exceeded {0} without completing")]
    ToolLoopOverflow(usize),
}

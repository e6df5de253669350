//! Agent invocation boundary.
//!
//! The reasoning itself — the model loop, token trimming, vector memory —
//! lives in a hosted agent runtime behind the [`graph::AgentGraph`] trait.
//! This crate owns the contract: transcript in, structured response out,
//! with client-side tool execution driven through a bounded start/resume
//! round-trip.

pub mod context;
pub mod graph;
pub mod prompt;
pub mod remote;
pub mod response;
pub mod runtime;
pub mod tool;

pub use context::BotContext;
pub use graph::{AgentError, AgentGraph, GraphRequest, GraphTurn};
pub use remote::{NullGraph, RemoteGraph};
pub use response::{DeliveryOptions, StructuredResponse};
pub use runtime::AgentRuntime;
pub use tool::{Tool, ToolCall, ToolDefinition, ToolOutput, ToolResult};

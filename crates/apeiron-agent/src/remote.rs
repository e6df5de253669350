//! HTTP client for the hosted agent runtime.
//!
//! Wire contract:
//!   POST {base}/runs/wait
//!     { assistant_id, input: { messages }, config: { configurable }, tools }
//!   POST {base}/runs/{run_id}/resume
//!     { tool_outputs }
//! Both answer
//!   { run_id, status: "completed" | "requires_tools",
//!     structured_response?, tool_calls? }

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::{AgentError, AgentGraph, GraphRequest, GraphTurn};
use crate::response::StructuredResponse;
use crate::tool::{ToolCall, ToolOutput};

pub struct RemoteGraph {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemoteGraph {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    async fn post<B: Serialize>(&self, url: &str, body: &B) -> Result<RunEnvelope, AgentError> {
        let mut req = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "agent runtime error");
            return Err(AgentError::Api {
                status,
                message: text,
            });
        }

        let envelope: RunEnvelope = resp
            .json()
            .await
            .map_err(|e| AgentError::Parse(e.to_string()))?;
        Ok(envelope)
    }
}

#[async_trait]
impl AgentGraph for RemoteGraph {
    fn name(&self) -> &str {
        "remote"
    }

    async fn start(&self, request: GraphRequest) -> Result<GraphTurn, AgentError> {
        let url = format!("{}/runs/wait", self.base_url);
        debug!(assistant = %request.assistant, turns = request.input.len(), "starting run");

        let body = serde_json::json!({
            "assistant_id": request.assistant,
            "input": { "messages": request.input },
            "config": { "configurable": request.configurable },
            "tools": request.tools,
        });

        self.post(&url, &body).await?.into_turn()
    }

    async fn resume(
        &self,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<GraphTurn, AgentError> {
        let url = format!("{}/runs/{}/resume", self.base_url, run_id);
        debug!(run_id, outputs = outputs.len(), "resuming run");

        let body = serde_json::json!({ "tool_outputs": outputs });
        self.post(&url, &body).await?.into_turn()
    }
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    #[serde(default)]
    run_id: Option<String>,
    status: String,
    #[serde(default)]
    structured_response: Option<StructuredResponse>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

impl RunEnvelope {
    fn into_turn(self) -> Result<GraphTurn, AgentError> {
        match self.status.as_str() {
            "completed" => {
                let structured = self.structured_response.ok_or_else(|| {
                    AgentError::Parse("completed run without structured_response".to_string())
                })?;
                Ok(GraphTurn::Finished(structured))
            }
            "requires_tools" => {
                let run_id = self.run_id.ok_or_else(|| {
                    AgentError::Parse("requires_tools run without run_id".to_string())
                })?;
                if self.tool_calls.is_empty() {
                    return Err(AgentError::Parse(
                        "requires_tools run without tool_calls".to_string(),
                    ));
                }
                Ok(GraphTurn::ToolUse {
                    run_id,
                    calls: self.tool_calls,
                })
            }
            other => Err(AgentError::Parse(format!("unknown run status: {other}"))),
        }
    }
}

/// Placeholder graph when no runtime URL is configured: the bot starts,
/// serves its health endpoints, and logs an unavailable error per
/// invocation instead of going down.
pub struct NullGraph;

#[async_trait]
impl AgentGraph for NullGraph {
    fn name(&self) -> &str {
        "null"
    }

    async fn start(&self, _request: GraphRequest) -> Result<GraphTurn, AgentError> {
        Err(AgentError::Unavailable(
            "no agent runtime configured — set agent.runtime_url in apeiron.toml".to_string(),
        ))
    }

    async fn resume(
        &self,
        _run_id: &str,
        _outputs: Vec<ToolOutput>,
    ) -> Result<GraphTurn, AgentError> {
        Err(AgentError::Unavailable(
            "no agent runtime configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_envelope_yields_finished_turn() {
        let envelope: RunEnvelope = serde_json::from_value(serde_json::json!({
            "run_id": "r1",
            "status": "completed",
            "structured_response": { "action": "send", "content": "hi" },
        }))
        .expect("parses");
        match envelope.into_turn().expect("turn") {
            GraphTurn::Finished(StructuredResponse::Send { content, .. }) => {
                assert_eq!(content.as_deref(), Some("hi"));
            }
            other => panic!("expected finished send, got {other:?}"),
        }
    }

    #[test]
    fn requires_tools_envelope_yields_tool_use() {
        let envelope: RunEnvelope = serde_json::from_value(serde_json::json!({
            "run_id": "r2",
            "status": "requires_tools",
            "tool_calls": [{ "id": "c1", "name": "get_message", "input": {} }],
        }))
        .expect("parses");
        match envelope.into_turn().expect("turn") {
            GraphTurn::ToolUse { run_id, calls } => {
                assert_eq!(run_id, "r2");
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "get_message");
            }
            other => panic!("expected tool use, got {other:?}"),
        }
    }

    #[test]
    fn completed_without_response_is_a_parse_error() {
        let envelope: RunEnvelope =
            serde_json::from_value(serde_json::json!({ "status": "completed" })).expect("parses");
        assert!(matches!(
            envelope.into_turn(),
            Err(AgentError::Parse(_))
        ));
    }

    #[test]
    fn trailing_slash_is_normalized() {
        let graph = RemoteGraph::new("http://runtime:2024/", None);
        assert_eq!(graph.base_url, "http://runtime:2024");
    }
}

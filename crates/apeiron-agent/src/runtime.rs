//! Agent runtime front object: owns the graph handle, the system prompt,
//! and the tool round-trip driver.

use tracing::{debug, info, warn};

use apeiron_core::{InvocationScope, TranscriptTurn};

use crate::graph::{AgentError, AgentGraph, GraphRequest, GraphTurn};
use crate::response::StructuredResponse;
use crate::tool::{self, Tool, ToolOutput};

/// Cap on start/resume round-trips per invocation.
const DEFAULT_MAX_ROUNDS: usize = 8;

pub struct AgentRuntime {
    graph: Box<dyn AgentGraph>,
    system: TranscriptTurn,
    assistant: String,
    max_rounds: usize,
}

impl AgentRuntime {
    pub fn new(graph: Box<dyn AgentGraph>, system: TranscriptTurn, assistant: String) -> Self {
        Self {
            graph,
            system,
            assistant,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn assistant(&self) -> &str {
        &self.assistant
    }

    /// Run one full invocation: system turn + transcript in, structured
    /// response out, executing any tool calls the runtime parks on.
    ///
    /// Turns with empty content are dropped before the request goes out —
    /// nothing empty ever reaches the model. Tool failures flow back to
    /// the runtime as error outputs; only transport/protocol problems and
    /// an overrunning loop surface as `Err`.
    pub async fn invoke(
        &self,
        transcript: Vec<TranscriptTurn>,
        scope: &InvocationScope,
        tools: &[Box<dyn Tool>],
    ) -> Result<StructuredResponse, AgentError> {
        let mut input = Vec::with_capacity(transcript.len() + 1);
        input.push(self.system.clone());
        input.extend(transcript.into_iter().filter(|t| !t.content.is_empty()));

        let request = GraphRequest {
            assistant: self.assistant.clone(),
            input,
            configurable: scope.to_map(),
            tools: tool::to_definitions(tools),
        };

        let mut turn = self.graph.start(request).await?;

        for round in 0..self.max_rounds {
            match turn {
                GraphTurn::Finished(structured) => {
                    info!(
                        graph = self.graph.name(),
                        thread = %scope.thread_id,
                        rounds = round,
                        "invocation complete"
                    );
                    return Ok(structured);
                }
                GraphTurn::ToolUse { run_id, calls } => {
                    debug!(run_id = %run_id, calls = calls.len(), "executing requested tools");
                    let mut outputs = Vec::with_capacity(calls.len());
                    for call in &calls {
                        let result = match tools.iter().find(|t| t.name() == call.name) {
                            Some(t) => t.execute(call.input.clone(), scope).await,
                            None => {
                                warn!(tool = %call.name, "runtime requested unknown tool");
                                crate::tool::ToolResult::error(format!(
                                    "unknown tool: {}",
                                    call.name
                                ))
                            }
                        };
                        if result.is_error {
                            debug!(tool = %call.name, "tool returned error result");
                        }
                        outputs.push(ToolOutput::from_result(call, result));
                    }
                    turn = self.graph.resume(&run_id, outputs).await?;
                }
            }
        }

        warn!(
            max_rounds = self.max_rounds,
            thread = %scope.thread_id,
            "tool round-trips exhausted"
        );
        Err(AgentError::ToolLoopOverflow(self.max_rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolCall;
    use apeiron_core::{ChatMessage, MessageAuthor, TurnContent};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn scope() -> InvocationScope {
        InvocationScope::from_message(&ChatMessage {
            id: 1,
            channel_id: 2,
            guild_id: Some(3),
            parent_id: None,
            author: MessageAuthor {
                id: 4,
                name: "u".to_string(),
                display_name: String::new(),
                bot: false,
            },
            content: "hi".to_string(),
            attachments: Vec::new(),
            mentions_self: true,
            replies_to_self: false,
            created_at: chrono::Utc::now(),
            edited_at: None,
        })
    }

    /// Graph that records how many turns it received and finishes.
    struct EchoGraph {
        seen_turns: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl AgentGraph for EchoGraph {
        fn name(&self) -> &str {
            "echo"
        }
        async fn start(&self, request: GraphRequest) -> Result<GraphTurn, AgentError> {
            self.seen_turns.store(request.input.len(), Ordering::Relaxed);
            Ok(GraphTurn::Finished(StructuredResponse::Noop))
        }
        async fn resume(&self, _: &str, _: Vec<ToolOutput>) -> Result<GraphTurn, AgentError> {
            unreachable!("echo graph never parks")
        }
    }

    /// Graph that always parks on a tool call.
    struct GreedyGraph {
        rounds: AtomicUsize,
    }

    #[async_trait]
    impl AgentGraph for GreedyGraph {
        fn name(&self) -> &str {
            "greedy"
        }
        async fn start(&self, _: GraphRequest) -> Result<GraphTurn, AgentError> {
            Ok(GraphTurn::ToolUse {
                run_id: "r".to_string(),
                calls: vec![ToolCall {
                    id: "c".to_string(),
                    name: "missing".to_string(),
                    input: serde_json::json!({}),
                }],
            })
        }
        async fn resume(&self, _: &str, outputs: Vec<ToolOutput>) -> Result<GraphTurn, AgentError> {
            // Unknown tools come back as error outputs, not failures.
            assert!(outputs.iter().all(|o| o.is_error));
            self.rounds.fetch_add(1, Ordering::Relaxed);
            self.start(GraphRequest {
                assistant: String::new(),
                input: Vec::new(),
                configurable: Default::default(),
                tools: Vec::new(),
            })
            .await
        }
    }

    #[tokio::test]
    async fn empty_turns_are_dropped_and_system_prepended() {
        let seen = Arc::new(AtomicUsize::new(0));
        let runtime = AgentRuntime::new(
            Box::new(EchoGraph {
                seen_turns: Arc::clone(&seen),
            }),
            TranscriptTurn::system("be brief"),
            "operator-6o".to_string(),
        );
        let transcript = vec![
            TranscriptTurn {
                role: apeiron_core::Role::User,
                content: TurnContent::Text(String::new()),
            },
            TranscriptTurn {
                role: apeiron_core::Role::User,
                content: TurnContent::Text("hello".to_string()),
            },
        ];
        let response = runtime
            .invoke(transcript, &scope(), &[])
            .await
            .expect("invokes");
        assert_eq!(response, StructuredResponse::Noop);
        // system turn + the one non-empty user turn
        assert_eq!(seen.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn runaway_tool_loop_is_bounded() {
        let runtime = AgentRuntime::new(
            Box::new(GreedyGraph {
                rounds: AtomicUsize::new(0),
            }),
            TranscriptTurn::system("s"),
            "operator-6o".to_string(),
        )
        .with_max_rounds(3);
        let result = runtime.invoke(Vec::new(), &scope(), &[]).await;
        assert!(matches!(result, Err(AgentError::ToolLoopOverflow(3))));
    }

    #[tokio::test]
    async fn null_graph_reports_unavailable() {
        let runtime = AgentRuntime::new(
            Box::new(crate::remote::NullGraph),
            TranscriptTurn::system("s"),
            "operator-6o".to_string(),
        );
        let result = runtime.invoke(Vec::new(), &scope(), &[]).await;
        assert!(matches!(result, Err(AgentError::Unavailable(_))));
    }
}

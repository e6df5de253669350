//! Host context interface.
//!
//! Defined here rather than in the channel crate so the dependency graph
//! stays acyclic: the Discord adapter depends on `apeiron-agent`, and the
//! gateway binary implements this trait on its `AppState`.

use apeiron_core::ConnectionHealth;

use crate::runtime::AgentRuntime;

/// Minimal interface the Discord handler needs from its host process.
pub trait BotContext: Send + Sync {
    fn agent(&self) -> &AgentRuntime;
    fn health(&self) -> &ConnectionHealth;
}

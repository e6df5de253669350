use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use apeiron_agent::{AgentRuntime, BotContext};
use apeiron_core::ConnectionHealth;

/// Central shared state, passed as `Arc<AppState>` to the Axum handlers
/// and into the Discord adapter.
pub struct AppState {
    pub agent: AgentRuntime,
    pub health: ConnectionHealth,
}

impl AppState {
    pub fn new(agent: AgentRuntime) -> Self {
        Self {
            agent,
            health: ConnectionHealth::new(),
        }
    }
}

impl BotContext for AppState {
    fn agent(&self) -> &AgentRuntime {
        &self.agent
    }

    fn health(&self) -> &ConnectionHealth {
        &self.health
    }
}

/// Assemble the HTTP router: health probes only, the bot's actual work
/// happens on the Discord gateway connection.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/healthz", get(crate::http::health::livez_handler))
        .route("/livez", get(crate::http::health::livez_handler))
        .route("/readyz", get(crate::http::health::readyz_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

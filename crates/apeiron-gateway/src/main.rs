use std::sync::Arc;

use tracing::{info, warn};

use apeiron_agent::{AgentGraph, AgentRuntime, NullGraph, RemoteGraph};
use apeiron_core::ApeironConfig;
use apeiron_discord::DiscordAdapter;

mod app;
mod http;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // config: explicit path via APEIRON_CONFIG, else ./apeiron.toml.
    // A missing bot token is fatal here, before anything connects.
    let config_path = std::env::var("APEIRON_CONFIG").ok();
    let config = ApeironConfig::load(config_path.as_deref())?;

    let system = match &config.agent.prompt_path {
        Some(path) => apeiron_agent::prompt::load(path)?,
        None => apeiron_agent::prompt::default_prompt(&config.agent.variant),
    };

    let graph: Box<dyn AgentGraph> = match &config.agent.runtime_url {
        Some(url) => {
            info!(url = %url, "using hosted agent runtime");
            Box::new(RemoteGraph::new(url.clone(), config.agent.api_key.clone()))
        }
        None => {
            warn!("agent.runtime_url not configured; invocations will fail until it is");
            Box::new(NullGraph)
        }
    };
    let agent = AgentRuntime::new(graph, system, config.agent.variant.clone());

    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let max_history = config.agent.max_history;
    let discord_config = config.discord.clone();

    let state = Arc::new(app::AppState::new(agent));
    let router = app::build_router(Arc::clone(&state));

    // The adapter owns its own reconnect loop and never returns.
    let adapter = DiscordAdapter::new(&discord_config, max_history, Arc::clone(&state));
    tokio::spawn(adapter.run());

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install shutdown handler");
        return;
    }
    info!("shutdown signal received");
}

/// Logging setup from the environment: `LOG_LEVEL` (or `DEBUG=true` for a
/// debug default), `LOG_FORMAT=json` for structured output, and `RUST_LOG`
/// taking precedence over both when set.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let debug = std::env::var("DEBUG")
        .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if debug { "debug" } else { "info" }.to_string()
    });
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "apeiron_gateway={level},apeiron_discord={level},apeiron_agent={level},apeiron_core={level}"
        ))
    });

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

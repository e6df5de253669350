use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (apeiron.toml + APEIRON_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApeironConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Agent runtime selection and model identifiers.
///
/// The model and embedding ids are forwarded to the hosted runtime as-is;
/// this process never talks to a model provider directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_embedding")]
    pub embedding: String,
    /// Which agent variant the hosted runtime should run.
    #[serde(default = "default_variant")]
    pub variant: String,
    /// Path to the YAML system-prompt file. Built-in prompt when unset.
    pub prompt_path: Option<String>,
    /// Base URL of the hosted agent runtime. Without it the bot starts but
    /// every invocation fails with a logged "unavailable" error.
    pub runtime_url: Option<String>,
    /// Bearer token for the hosted runtime.
    pub api_key: Option<String>,
    /// How many backlog messages to aggregate per invocation.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            embedding: default_embedding(),
            variant: default_variant(),
            prompt_path: None,
            runtime_url: None,
            api_key: None,
            max_history: default_max_history(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiscordConfig {
    /// Bot token. Missing token aborts startup before any event loop runs.
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

fn default_model() -> String {
    "mistralai:ministral-3b-2410".to_string()
}
fn default_embedding() -> String {
    "mistralai:mistral-embed".to_string()
}
fn default_variant() -> String {
    "operator-6o".to_string()
}
fn default_max_history() -> usize {
    100
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl ApeironConfig {
    /// Load config from a TOML file with APEIRON_* env var overrides.
    ///
    /// The short env names the deployment has always used (`APEIRON_MODEL`,
    /// `APEIRON_EMBEDDING`, `APEIRON_AGENT`) map onto the `[agent]` section;
    /// everything else nests with `__` (e.g. `APEIRON_GATEWAY__PORT`). The
    /// Discord token additionally honors the bare `DISCORD_TOKEN` env var.
    /// A missing token is a hard error — the caller is expected to abort
    /// before connecting anything.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("apeiron.toml");

        let mut config: ApeironConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("APEIRON_")
                    .map(|key| match key.as_str() {
                        "MODEL" => "agent.model".into(),
                        "EMBEDDING" => "agent.embedding".into(),
                        "AGENT" => "agent.variant".into(),
                        other => other.to_lowercase().replace("__", ".").into(),
                    })
                    .split("."),
            )
            .extract()
            .map_err(|e| crate::error::ApeironError::Config(e.to_string()))?;

        if config.discord.bot_token.is_empty() {
            if let Ok(token) = std::env::var("DISCORD_TOKEN") {
                config.discord.bot_token = token;
            }
        }

        if config.discord.bot_token.is_empty() {
            return Err(crate::error::ApeironError::Config(
                "DISCORD_TOKEN is not set and discord.bot_token is empty".to_string(),
            ));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = ApeironConfig {
            agent: AgentConfig::default(),
            discord: DiscordConfig::default(),
            gateway: GatewayConfig::default(),
        };
        assert_eq!(cfg.agent.model, "mistralai:ministral-3b-2410");
        assert_eq!(cfg.agent.variant, "operator-6o");
        assert_eq!(cfg.agent.max_history, 100);
        assert_eq!(cfg.gateway.port, 8080);
    }

    #[test]
    fn toml_sections_deserialize() {
        let cfg: ApeironConfig = toml_str(
            r#"
            [agent]
            model = "mistralai:mistral-large-2411"
            runtime_url = "http://runtime:2024"

            [discord]
            bot_token = "abc"

            [gateway]
            port = 9000
            "#,
        );
        assert_eq!(cfg.agent.model, "mistralai:mistral-large-2411");
        assert_eq!(cfg.agent.runtime_url.as_deref(), Some("http://runtime:2024"));
        assert_eq!(cfg.discord.bot_token, "abc");
        assert_eq!(cfg.gateway.port, 9000);
        // untouched sections keep their defaults
        assert_eq!(cfg.agent.embedding, "mistralai:mistral-embed");
        assert_eq!(cfg.gateway.bind, "0.0.0.0");
    }

    fn toml_str(s: &str) -> ApeironConfig {
        Figment::new()
            .merge(Toml::string(s))
            .extract()
            .expect("valid toml")
    }
}

use std::sync::Arc;
use std::time::Duration;

use serenity::model::gateway::GatewayIntents;
use serenity::Client;
use tracing::{error, info, warn};

use apeiron_agent::BotContext;
use apeiron_core::DiscordConfig;

use crate::handler::DiscordHandler;

/// Discord channel adapter.
///
/// Wraps a serenity `Client` and drives the event loop until the process
/// exits. Reconnects automatically whenever the gateway drops.
pub struct DiscordAdapter<C: BotContext + 'static> {
    ctx: Arc<C>,
    config: DiscordConfig,
    max_history: usize,
}

impl<C: BotContext + 'static> DiscordAdapter<C> {
    pub fn new(config: &DiscordConfig, max_history: usize, ctx: Arc<C>) -> Self {
        Self {
            ctx,
            config: config.clone(),
            max_history,
        }
    }

    /// Connect to Discord and keep reconnecting whenever the gateway drops.
    ///
    /// Never returns — runs for the lifetime of the process. The liveness
    /// flag flips to closed while the gateway is down and back to ready on
    /// the next successful `ready` event.
    pub async fn run(self) {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = loop {
            match self.build_client(intents).await {
                Ok(c) => break c,
                Err(e) => {
                    error!("Discord: initial connect failed ({e}), retrying in 30s");
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
            }
        };

        loop {
            info!("Discord: gateway connecting");

            if let Err(e) = client.start().await {
                warn!("Discord: gateway error ({e}), reconnecting in 5s");
            } else {
                info!("Discord: gateway stopped cleanly, reconnecting in 5s");
            }
            self.ctx.health().mark_closed();

            tokio::time::sleep(Duration::from_secs(5)).await;

            client = loop {
                match self.build_client(intents).await {
                    Ok(c) => break c,
                    Err(e) => {
                        error!("Discord: reconnect failed ({e}), retrying in 30s");
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
            };
        }
    }

    async fn build_client(&self, intents: GatewayIntents) -> Result<Client, serenity::Error> {
        let handler = DiscordHandler::new(Arc::clone(&self.ctx), self.max_history);

        Client::builder(&self.config.bot_token, intents)
            .event_handler(handler)
            .await
    }
}

use std::sync::{Arc, OnceLock};

use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::UserId;
use serenity::prelude::{Context, EventHandler};
use tracing::{debug, error, info};

use apeiron_agent::{BotContext, Tool};
use apeiron_core::InvocationScope;

use crate::dispatch;
use crate::history;
use crate::routing;
use crate::tools;
use crate::view;

/// Serenity event handler wired to the agent runtime.
pub struct DiscordHandler<C: BotContext + 'static> {
    pub ctx: Arc<C>,
    pub max_history: usize,
    pub bot_id: OnceLock<UserId>,
    /// Tool kit over the REST connection, built on first `ready`.
    pub tools: OnceLock<Arc<Vec<Box<dyn Tool>>>>,
}

impl<C: BotContext + 'static> DiscordHandler<C> {
    pub fn new(ctx: Arc<C>, max_history: usize) -> Self {
        Self {
            ctx,
            max_history,
            bot_id: OnceLock::new(),
            tools: OnceLock::new(),
        }
    }
}

#[async_trait]
impl<C: BotContext + 'static> EventHandler for DiscordHandler<C> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        self.bot_id.set(ready.user.id).ok();
        self.tools
            .get_or_init(|| Arc::new(tools::toolkit(Arc::clone(&ctx.http))));
        self.ctx.health().mark_ready();

        info!(
            name = %ready.user.name,
            guilds = ready.guilds.len(),
            "Discord bot connected"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(bot_id) = self.bot_id.get().copied() else {
            return;
        };

        let parent_id = view::resolve_thread(&ctx, &msg);
        let chat = view::chat_message(&msg, bot_id, parent_id);

        if !routing::should_engage(&chat, bot_id.get()) {
            return;
        }

        let Some(tools) = self.tools.get().map(Arc::clone) else {
            return;
        };

        debug!(
            channel_id = chat.channel_id,
            author = %chat.author.name,
            "engaging with message"
        );

        // Best-effort; a failed typing indicator never blocks the turn.
        let _ = msg.channel_id.broadcast_typing(&ctx.http).await;

        let app = Arc::clone(&self.ctx);
        let http = Arc::clone(&ctx.http);
        let channel_id = msg.channel_id;
        let reply_to = msg.id;
        let max_history = self.max_history;

        // One task per inbound message, so a slow invocation never stalls
        // the gateway event loop.
        tokio::spawn(async move {
            let scope = InvocationScope::from_message(&chat);

            let transcript =
                match history::fetch_transcript(&http, channel_id, bot_id, Some(max_history)).await
                {
                    Ok(transcript) => transcript,
                    Err(e) => {
                        error!(error = %e, channel_id = channel_id.get(), "history fetch failed");
                        return;
                    }
                };

            let response = match app.agent().invoke(transcript, &scope, &tools).await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, thread = %scope.thread_id, "agent invocation failed");
                    return;
                }
            };

            if let Err(e) = dispatch::dispatch(&http, channel_id, reply_to, response).await {
                error!(error = %e, channel_id = channel_id.get(), "response dispatch failed");
            }
        });
    }
}

//! Conversation history aggregation.
//!
//! Walks a channel's backlog (the platform delivers newest-first), feeds
//! each message through the view + transcript adapter, and returns the
//! merged, chronological transcript.

use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};

use apeiron_core::{TranscriptBuilder, TranscriptTurn};

use crate::error::DiscordError;
use crate::view;

/// Discord's per-request history page size.
const PAGE_SIZE: u8 = 100;

/// Fetch up to `limit` recent messages from `channel_id` and aggregate
/// them into a chronological transcript. `limit = None` pages until the
/// channel is exhausted.
///
/// Fetch failures propagate; an empty channel yields an empty transcript.
pub async fn fetch_transcript(
    http: &Http,
    channel_id: ChannelId,
    bot_id: UserId,
    limit: Option<usize>,
) -> Result<Vec<TranscriptTurn>, DiscordError> {
    let mut builder = TranscriptBuilder::new();
    let mut fetched = 0usize;
    let mut cursor = None;

    loop {
        let page_size = match limit {
            Some(limit) if limit - fetched < usize::from(PAGE_SIZE) => (limit - fetched) as u8,
            _ => PAGE_SIZE,
        };
        if page_size == 0 {
            break;
        }

        let mut request = GetMessages::new().limit(page_size);
        if let Some(before) = cursor {
            request = request.before(before);
        }

        let page = channel_id.messages(http, request).await?;
        let exhausted = page.len() < usize::from(page_size);

        for msg in &page {
            // History fetches return the raw channel; messages in a thread
            // were fetched from the thread channel itself, so the identity
            // work already happened on the inbound side. Here only the
            // role/content mapping matters.
            builder.push_message(&view::chat_message(msg, bot_id, None));
        }

        fetched += page.len();
        cursor = page.last().map(|m| m.id);

        if exhausted || limit.is_some_and(|l| fetched >= l) {
            break;
        }
    }

    Ok(builder.finish())
}

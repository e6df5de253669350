//! serenity `Message` → [`ChatMessage`] view conversion.
//!
//! Done once at the edge so everything behavioral (routing, identity,
//! transcript assembly) runs on plain values.

use chrono::{DateTime, Utc};
use serenity::model::channel::{ChannelType, Message};
use serenity::model::id::UserId;
use serenity::prelude::Context;

use apeiron_core::{ChatMessage, MessageAttachment, MessageAuthor};

/// Resolve the parent text channel when the message arrived in a thread,
/// from the guild cache.
///
/// The cache keeps threads in `Guild::threads`, not in `Guild::channels`,
/// so both collections are consulted. Returns `None` when the delivery
/// channel is an ordinary channel (or the guild is not cached).
pub fn resolve_thread(ctx: &Context, msg: &Message) -> Option<u64> {
    let guild = ctx.cache.guild(msg.guild_id?)?;
    let channel = guild
        .threads
        .iter()
        .find(|thread| thread.id == msg.channel_id)
        .or_else(|| guild.channels.get(&msg.channel_id))?;
    if matches!(
        channel.kind,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
    ) {
        channel.parent_id.map(|id| id.get())
    } else {
        None
    }
}

/// Flatten a serenity message into the SDK-independent view.
///
/// `bot_id` is the bot's own identity, used to precompute the
/// mention/reply targeting flags the routing predicates consume.
pub fn chat_message(msg: &Message, bot_id: UserId, parent_id: Option<u64>) -> ChatMessage {
    let replies_to_self = msg
        .referenced_message
        .as_deref()
        .is_some_and(|referenced| referenced.author.id == bot_id);

    ChatMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        guild_id: msg.guild_id.map(|id| id.get()),
        parent_id,
        author: MessageAuthor {
            id: msg.author.id.get(),
            name: msg.author.name.clone(),
            display_name: msg
                .author
                .global_name
                .clone()
                .unwrap_or_else(|| msg.author.name.clone()),
            bot: msg.author.bot,
        },
        content: msg.content.clone(),
        attachments: msg
            .attachments
            .iter()
            .map(|a| MessageAttachment {
                filename: a.filename.clone(),
                url: a.url.clone(),
                size: u64::from(a.size),
                content_type: a.content_type.clone(),
                width: a.width,
                height: a.height,
            })
            .collect(),
        mentions_self: msg.mentions_user_id(bot_id),
        replies_to_self,
        created_at: to_utc(msg.timestamp),
        edited_at: msg.edited_timestamp.map(to_utc),
    }
}

fn to_utc(ts: serenity::model::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

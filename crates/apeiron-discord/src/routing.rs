//! Routing predicates — whether the bot engages with an inbound message.
//!
//! Three independent, stateless checks; the gate is
//! `!self_authored && (targeted || private)`. The bot never reacts to its
//! own output (that way lies an infinite loop), only speaks up in guild
//! channels when addressed, and always engages in private conversations.

use apeiron_core::ChatMessage;

/// True iff the message was written by the bot itself.
pub fn is_self_authored(message: &ChatMessage, bot_id: u64) -> bool {
    message.author.id == bot_id
}

/// True iff the bot is mentioned in, or the message replies to, the bot.
pub fn is_targeted(message: &ChatMessage) -> bool {
    message.mentions_self || message.replies_to_self
}

/// True iff the message has no owning guild (a direct conversation).
pub fn is_private_scope(message: &ChatMessage) -> bool {
    message.guild_id.is_none()
}

/// The engage decision, recomputed per message with no stored state.
pub fn should_engage(message: &ChatMessage, bot_id: u64) -> bool {
    !is_self_authored(message, bot_id) && (is_targeted(message) || is_private_scope(message))
}

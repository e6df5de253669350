//! Turns a structured agent response into a platform action.
//!
//! The agent speaks in JSON; this module translates its delivery options
//! into serenity builders and performs the send. Unknown actions are
//! logged and dropped so a newer runtime never crashes an older adapter.

use serde_json::Value;
use serenity::builder::{
    CreateAllowedMentions, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage,
};
use serenity::http::Http;
use serenity::model::channel::MessageFlags;
use serenity::model::id::{ChannelId, MessageId, StickerId};
use tracing::{debug, warn};

use apeiron_agent::{DeliveryOptions, StructuredResponse};

use crate::error::DiscordError;
use crate::send;

/// Execute `response` against the channel that triggered the invocation.
///
/// `message_id` is the triggering message, used as the reply target.
pub async fn dispatch(
    http: &Http,
    channel_id: ChannelId,
    message_id: MessageId,
    response: StructuredResponse,
) -> Result<(), DiscordError> {
    match response {
        StructuredResponse::Send { content, options } => {
            deliver(http, channel_id, None, content, &options).await
        }
        StructuredResponse::Reply { content, options } => {
            deliver(http, channel_id, Some(message_id), content, &options).await
        }
        StructuredResponse::Noop => {
            debug!(channel_id = channel_id.get(), "agent chose not to respond");
            Ok(())
        }
        StructuredResponse::Unknown => {
            warn!(
                channel_id = channel_id.get(),
                "agent returned an unrecognized action, ignoring"
            );
            Ok(())
        }
    }
}

async fn deliver(
    http: &Http,
    channel_id: ChannelId,
    reply_to: Option<MessageId>,
    content: Option<String>,
    options: &DeliveryOptions,
) -> Result<(), DiscordError> {
    let text = content.unwrap_or_default();
    if text.is_empty() && options.embeds.is_empty() && options.stickers.is_empty() {
        debug!(
            channel_id = channel_id.get(),
            "response carried nothing deliverable"
        );
        return Ok(());
    }

    let mut first = apply_options(CreateMessage::new(), options);
    if let Some(reply_to) = reply_to {
        first = first.reference_message((channel_id, reply_to));
    }

    send::send_chunked(http, channel_id, &text, first).await?;
    Ok(())
}

/// Apply agent-requested delivery options to a message builder.
///
/// Options attach to the first chunk only; continuation chunks of a long
/// response stay plain.
pub(crate) fn apply_options(mut builder: CreateMessage, options: &DeliveryOptions) -> CreateMessage {
    if options.tts {
        builder = builder.tts(true);
    }
    if !options.embeds.is_empty() {
        builder = builder.embeds(options.embeds.iter().map(embed_from_value).collect());
    }
    let stickers = sticker_ids(&options.stickers);
    if !stickers.is_empty() {
        builder = builder.add_sticker_ids(stickers);
    }
    if let Some(mentions) = &options.allowed_mentions {
        builder = builder.allowed_mentions(allowed_mentions_from_value(mentions));
    }

    let mut flags = MessageFlags::empty();
    if options.suppress_embeds {
        flags |= MessageFlags::SUPPRESS_EMBEDS;
    }
    if options.silent {
        flags |= MessageFlags::SUPPRESS_NOTIFICATIONS;
    }
    if !flags.is_empty() {
        builder = builder.flags(flags);
    }

    builder
}

/// Drop zero ids before they reach `StickerId::new`, which panics on
/// zero.
fn sticker_ids(ids: &[u64]) -> Vec<StickerId> {
    ids.iter()
        .copied()
        .filter(|&id| id != 0)
        .map(StickerId::new)
        .collect()
}

/// Build an embed from the agent's JSON description.
///
/// Recognized keys follow the platform's embed object: `title`,
/// `description`, `url`, `color` (integer or `#rrggbb` string), `image`,
/// `thumbnail`, `footer`, `author`, and `fields`. Unknown keys are
/// ignored rather than rejected.
fn embed_from_value(value: &Value) -> CreateEmbed {
    let mut embed = CreateEmbed::new();

    if let Some(title) = value.get("title").and_then(Value::as_str) {
        embed = embed.title(title);
    }
    if let Some(description) = value.get("description").and_then(Value::as_str) {
        embed = embed.description(description);
    }
    if let Some(url) = value.get("url").and_then(Value::as_str) {
        embed = embed.url(url);
    }
    if let Some(color) = value.get("color").and_then(color_from_value) {
        embed = embed.color(color);
    }
    if let Some(image) = value.get("image").and_then(image_url) {
        embed = embed.image(image);
    }
    if let Some(thumbnail) = value.get("thumbnail").and_then(image_url) {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(footer) = value.get("footer") {
        let text = footer
            .as_str()
            .or_else(|| footer.get("text").and_then(Value::as_str));
        if let Some(text) = text {
            embed = embed.footer(CreateEmbedFooter::new(text));
        }
    }
    if let Some(name) = value
        .get("author")
        .and_then(|a| a.get("name"))
        .and_then(Value::as_str)
    {
        embed = embed.author(CreateEmbedAuthor::new(name));
    }
    if let Some(fields) = value.get("fields").and_then(Value::as_array) {
        for field in fields {
            let name = field.get("name").and_then(Value::as_str).unwrap_or("");
            let field_value = field.get("value").and_then(Value::as_str).unwrap_or("");
            let inline = field
                .get("inline")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if !name.is_empty() || !field_value.is_empty() {
                embed = embed.field(name, field_value, inline);
            }
        }
    }

    embed
}

/// Accept either an integer colour or a `#rrggbb` / `rrggbb` hex string.
fn color_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as u32),
        Value::String(s) => u32::from_str_radix(s.trim_start_matches('#'), 16).ok(),
        _ => None,
    }
}

/// Image references come as either a bare URL string or `{"url": ...}`.
fn image_url(value: &Value) -> Option<&str> {
    value
        .as_str()
        .or_else(|| value.get("url").and_then(Value::as_str))
}

/// Build the mention allowance from the agent's JSON description.
///
/// Shape: `{"parse": ["users", "roles", "everyone"], "users": [ids],
/// "roles": [ids], "replied_user": bool}`. Absent keys leave the
/// corresponding class unmentionable, which is the conservative default.
fn allowed_mentions_from_value(value: &Value) -> CreateAllowedMentions {
    let mut mentions = CreateAllowedMentions::new();

    if let Some(parse) = value.get("parse").and_then(Value::as_array) {
        for class in parse.iter().filter_map(Value::as_str) {
            mentions = match class {
                "users" => mentions.all_users(true),
                "roles" => mentions.all_roles(true),
                "everyone" => mentions.everyone(true),
                _ => mentions,
            };
        }
    }
    if let Some(users) = value.get("users").and_then(Value::as_array) {
        mentions = mentions.users(users.iter().filter_map(Value::as_u64));
    }
    if let Some(roles) = value.get("roles").and_then(Value::as_array) {
        mentions = mentions.roles(roles.iter().filter_map(Value::as_u64));
    }
    if let Some(replied) = value.get("replied_user").and_then(Value::as_bool) {
        mentions = mentions.replied_user(replied);
    }

    mentions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embed_fields_round_trip_through_builder() {
        let embed = embed_from_value(&json!({
            "title": "Status",
            "description": "All good",
            "color": "#00ff00",
            "fields": [
                { "name": "Region", "value": "eu", "inline": true },
            ],
        }));
        let wire = serde_json::to_value(&embed).expect("embed serializes");
        assert_eq!(wire["title"], "Status");
        assert_eq!(wire["description"], "All good");
        assert_eq!(wire["color"], 0x00ff00);
        assert_eq!(wire["fields"][0]["name"], "Region");
        assert_eq!(wire["fields"][0]["inline"], true);
    }

    #[test]
    fn embed_footer_accepts_string_and_object_forms() {
        let from_str = embed_from_value(&json!({ "footer": "plain" }));
        let from_obj = embed_from_value(&json!({ "footer": { "text": "plain" } }));
        let a = serde_json::to_value(&from_str).expect("serializes");
        let b = serde_json::to_value(&from_obj).expect("serializes");
        assert_eq!(a["footer"]["text"], "plain");
        assert_eq!(b["footer"]["text"], "plain");
    }

    #[test]
    fn color_parses_numeric_and_hex() {
        assert_eq!(color_from_value(&json!(255)), Some(255));
        assert_eq!(color_from_value(&json!("#ff0000")), Some(0xff0000));
        assert_eq!(color_from_value(&json!("ff0000")), Some(0xff0000));
        assert_eq!(color_from_value(&json!("nope")), None);
    }

    #[test]
    fn zero_sticker_ids_are_dropped() {
        let ids = sticker_ids(&[0, 12, 0, 34]);
        assert_eq!(ids, vec![StickerId::new(12), StickerId::new(34)]);
        assert!(sticker_ids(&[0]).is_empty());
    }

    #[tokio::test]
    async fn noop_completes_without_a_platform_call() {
        // An Http with no token would fail any request it made.
        let http = Http::new("");
        let result = dispatch(
            &http,
            ChannelId::new(1),
            MessageId::new(1),
            StructuredResponse::Noop,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn unknown_action_is_dropped_without_a_platform_call() {
        let http = Http::new("");
        let result = dispatch(
            &http,
            ChannelId::new(1),
            MessageId::new(1),
            StructuredResponse::Unknown,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn empty_send_is_skipped_without_a_platform_call() {
        let http = Http::new("");
        let result = dispatch(
            &http,
            ChannelId::new(1),
            MessageId::new(1),
            StructuredResponse::Send {
                content: None,
                options: DeliveryOptions::default(),
            },
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn allowed_mentions_parse_classes() {
        let mentions = allowed_mentions_from_value(&json!({
            "parse": ["users", "everyone", "bogus"],
            "replied_user": false,
        }));
        let wire = serde_json::to_value(&mentions).expect("serializes");
        let parse = wire["parse"].as_array().expect("parse array");
        assert!(parse.contains(&json!("users")));
        assert!(parse.contains(&json!("everyone")));
        assert!(!parse.contains(&json!("roles")));
        assert_eq!(wire["replied_user"], false);
    }
}

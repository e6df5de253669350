//! JSON envelopes for platform objects returned by tools.
//!
//! Snowflake ids render as strings so they survive consumers that read
//! JSON numbers as doubles. Timestamps render RFC 3339.

use serde_json::{json, Value};
use serenity::model::channel::{Attachment, GuildChannel, Message};
use serenity::model::guild::{Emoji, Member, PartialGuild, Role};
use serenity::model::user::User;

pub fn message_to_value(message: &Message) -> Value {
    let mut envelope = json!({
        "content": message.content,
        "id": message.id.to_string(),
        "author": author_to_value(&message.author),
        "channel_id": message.channel_id.to_string(),
        "guild_id": message.guild_id.map(|id| id.to_string()),
        "timestamp": message.timestamp.to_string(),
        "edited_timestamp": message.edited_timestamp.map(|ts| ts.to_string()),
        "attachments": message
            .attachments
            .iter()
            .map(attachment_to_value)
            .collect::<Vec<_>>(),
    });

    if let Some(referenced) = message.referenced_message.as_deref() {
        envelope["reference"] = json!({
            "id": referenced.id.to_string(),
            "content": referenced.content,
            "author": referenced.author.name,
            "timestamp": referenced.timestamp.to_string(),
        });
    }

    envelope
}

pub fn author_to_value(author: &User) -> Value {
    json!({
        "id": author.id.to_string(),
        "name": author.name,
        "display_name": author.global_name.as_deref().unwrap_or(&author.name),
        "bot": author.bot,
        "avatar_url": author.avatar_url(),
    })
}

pub fn attachment_to_value(attachment: &Attachment) -> Value {
    let mut envelope = json!({
        "filename": attachment.filename,
        "url": attachment.url,
        "size": attachment.size,
        "content_type": attachment.content_type,
    });

    let is_image = attachment
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("image/"));
    if is_image {
        envelope["type"] = json!("image");
        envelope["dimensions"] = json!({
            "width": attachment.width,
            "height": attachment.height,
        });
    }

    envelope
}

pub fn user_to_value(user: &User) -> Value {
    json!({
        "id": user.id.to_string(),
        "name": user.name,
        "display_name": user.global_name.as_deref().unwrap_or(&user.name),
        "bot": user.bot,
        "created_at": user.id.created_at().to_string(),
        "avatar_url": user.avatar_url(),
        "banner_url": user.banner_url(),
        "accent_color": user.accent_colour.map(|c| format!("#{:06x}", c.0)),
    })
}

pub fn member_to_value(member: &Member) -> Value {
    json!({
        "id": member.user.id.to_string(),
        "name": member.user.name,
        "display_name": member.display_name(),
        "bot": member.user.bot,
        "roles": member.roles.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        "joined_at": member.joined_at.map(|ts| ts.to_string()),
        "premium_since": member.premium_since.map(|ts| ts.to_string()),
        "pending": member.pending,
        "nick": member.nick,
        "avatar_url": member.avatar_url(),
    })
}

pub fn channel_to_value(channel: &GuildChannel) -> Value {
    json!({
        "id": channel.id.to_string(),
        "name": channel.name,
        "type": channel.kind.name(),
        "position": channel.position,
        "category_id": channel.parent_id.map(|id| id.to_string()),
        "topic": channel.topic,
        "nsfw": channel.nsfw,
        "created_at": channel.id.created_at().to_string(),
        "parent_id": channel.parent_id.map(|id| id.to_string()),
    })
}

pub fn role_to_value(role: &Role) -> Value {
    json!({
        "id": role.id.to_string(),
        "name": role.name,
        "color": role.colour.0,
        "position": role.position,
        "permissions": role.permissions.bits(),
        "hoist": role.hoist,
        "managed": role.managed,
        "mentionable": role.mentionable,
        "created_at": role.id.created_at().to_string(),
    })
}

pub fn guild_to_value(guild: &PartialGuild) -> Value {
    let mut roles: Vec<&Role> = guild.roles.values().collect();
    roles.sort_by_key(|role| role.position);

    json!({
        "id": guild.id.to_string(),
        "name": guild.name,
        "description": guild.description,
        "owner_id": guild.owner_id.to_string(),
        "member_count": guild.approximate_member_count,
        "icon_url": guild.icon_url(),
        "banner_url": guild.banner_url(),
        "created_at": guild.id.created_at().to_string(),
        "premium_tier": u8::from(guild.premium_tier),
        "premium_subscription_count": guild.premium_subscription_count,
        "roles": roles.iter().map(|r| role_to_value(r)).collect::<Vec<_>>(),
    })
}

pub fn emoji_to_value(emoji: &Emoji, guild_id: u64) -> Value {
    json!({
        "id": emoji.id.to_string(),
        "name": emoji.name,
        "animated": emoji.animated,
        "available": emoji.available,
        "managed": emoji.managed,
        "require_colons": emoji.require_colons,
        "url": emoji_cdn_url(emoji.id.get(), emoji.animated),
        "created_at": emoji.id.created_at().to_string(),
        "guild_id": guild_id.to_string(),
    })
}

/// CDN location of a custom emoji asset.
fn emoji_cdn_url(emoji_id: u64, animated: bool) -> String {
    let ext = if animated { "gif" } else { "png" };
    format!("https://cdn.discordapp.com/emojis/{emoji_id}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_url_extension_tracks_animation() {
        assert_eq!(
            emoji_cdn_url(42, false),
            "https://cdn.discordapp.com/emojis/42.png"
        );
        assert_eq!(
            emoji_cdn_url(42, true),
            "https://cdn.discordapp.com/emojis/42.gif"
        );
    }
}

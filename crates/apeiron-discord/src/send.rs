//! Message delivery with length-limit chunking.

use serenity::builder::CreateMessage;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;

/// Maximum characters per Discord message (the platform limit is 2000;
/// 1950 leaves margin for trailing markdown the split may orphan).
const CHUNK_MAX: usize = 1950;

/// Split `text` into chunks of at most [`CHUNK_MAX`] bytes, preferring
/// newline and then space boundaries so words survive intact. Falls back
/// to the nearest UTF-8 boundary when a window has neither.
pub fn split_chunks(text: &str) -> Vec<String> {
    if text.len() <= CHUNK_MAX {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > CHUNK_MAX {
        let mut window_end = CHUNK_MAX;
        while !remaining.is_char_boundary(window_end) {
            window_end -= 1;
        }
        let window = &remaining[..window_end];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .filter(|&at| at > 0)
            .unwrap_or(window_end);

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }

    chunks
}

/// Deliver `text` to `channel_id` in order, one message per chunk.
///
/// `first` carries the per-response delivery options (embeds, reply
/// reference, flags); the builder for every later chunk is plain text so
/// stickers and references are not duplicated. Returns the first message
/// sent, whose id identifies the response.
pub async fn send_chunked(
    http: &Http,
    channel_id: ChannelId,
    text: &str,
    first: CreateMessage,
) -> Result<Message, serenity::Error> {
    let chunks = split_chunks(text);
    let mut iter = chunks.iter();

    let head = iter.next().map(String::as_str).unwrap_or_default();
    let sent = channel_id
        .send_message(http, first.content(head))
        .await?;

    for chunk in iter {
        channel_id
            .send_message(http, CreateMessage::new().content(chunk))
            .await?;
    }

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_single_chunk() {
        let chunks = split_chunks("Hello, world!");
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn long_text_splits_on_newline() {
        let line = "a".repeat(1000);
        let text = format!("{line}\n{line}");
        let chunks = split_chunks(&text);
        assert_eq!(chunks.len(), 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
            assert!(!c.contains('\n'));
        }
    }

    #[test]
    fn unbroken_text_hard_splits() {
        let text = "x".repeat(CHUNK_MAX * 2 + 10);
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        assert!(chunks.iter().all(|c| c.len() <= CHUNK_MAX));
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(CHUNK_MAX); // 2 bytes each
        let chunks = split_chunks(&text);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.len() <= CHUNK_MAX);
        }
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn split_preserves_all_non_whitespace_content() {
        let word = "word ".repeat(1000);
        let rejoined = split_chunks(&word).join(" ");
        assert_eq!(
            rejoined.split_whitespace().count(),
            word.split_whitespace().count()
        );
    }
}

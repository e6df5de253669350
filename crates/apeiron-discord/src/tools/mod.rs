//! The capability kit lent to the agent runtime.
//!
//! Eleven platform operations, each a [`Tool`] over the bot's REST
//! connection. Lookup failures (missing or inaccessible objects) come
//! back as descriptive success strings the model can read and recover
//! from; only `send_message` reports a hard error, because a failed send
//! means the response was not delivered.

mod channels;
mod guild;
mod members;
mod messages;
mod reaction;
mod send_message;

use std::fmt;
use std::sync::Arc;

use serde::de::{Deserialize, DeserializeOwned, Deserializer, Visitor};
use serenity::http::{Http, HttpError};

use apeiron_agent::{Tool, ToolResult};

pub use channels::{GetChannelTool, ListChannelsTool};
pub use guild::{GetEmojiTool, GetGuildTool};
pub use members::{GetUserTool, ListMembersTool, SearchMembersTool};
pub use messages::{GetMessageTool, ListMessagesTool};
pub use reaction::AddReactionTool;
pub use send_message::SendMessageTool;

/// Build the full tool kit over one shared REST connection.
pub fn toolkit(http: Arc<Http>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(SendMessageTool::new(Arc::clone(&http))),
        Box::new(AddReactionTool::new(Arc::clone(&http))),
        Box::new(GetMessageTool::new(Arc::clone(&http))),
        Box::new(ListMessagesTool::new(Arc::clone(&http))),
        Box::new(GetChannelTool::new(Arc::clone(&http))),
        Box::new(ListChannelsTool::new(Arc::clone(&http))),
        Box::new(GetUserTool::new(Arc::clone(&http))),
        Box::new(ListMembersTool::new(Arc::clone(&http))),
        Box::new(SearchMembersTool::new(Arc::clone(&http))),
        Box::new(GetGuildTool::new(Arc::clone(&http))),
        Box::new(GetEmojiTool::new(http)),
    ]
}

/// How a platform call failed, as far as tools care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Failure {
    NotFound,
    Forbidden,
    Other,
}

/// Classify a serenity error by REST status.
pub(crate) fn classify(err: &serenity::Error) -> Failure {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            match response.status_code.as_u16() {
                404 => Failure::NotFound,
                403 => Failure::Forbidden,
                _ => Failure::Other,
            }
        }
        _ => Failure::Other,
    }
}

/// Deserialize tool arguments, mapping malformed input to an error result
/// the agent can see instead of a dropped call.
pub(crate) fn parse_args<T: DeserializeOwned>(input: serde_json::Value) -> Result<T, ToolResult> {
    serde_json::from_value(input)
        .map_err(|e| ToolResult::error(format!("Invalid tool arguments: {e}")))
}

/// A platform id that models may pass as either a JSON number or a
/// decimal string. Zero is rejected at deserialization: no valid
/// platform id is zero, and serenity's id constructors panic on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Snowflake(pub u64);

impl Snowflake {
    pub fn get(self) -> u64 {
        self.0
    }
}

fn non_zero<E: serde::de::Error>(v: u64) -> Result<Snowflake, E> {
    if v == 0 {
        Err(E::custom("id must be non-zero"))
    } else {
        Ok(Snowflake(v))
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a platform id as integer or string")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Snowflake, E> {
                non_zero(v)
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Snowflake, E> {
                let v = u64::try_from(v).map_err(|_| E::custom("id out of range"))?;
                non_zero(v)
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Snowflake, E> {
                non_zero(v.parse().map_err(E::custom)?)
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Args {
        channel_id: Option<Snowflake>,
    }

    #[test]
    fn snowflake_accepts_number_and_string() {
        let a: Args = serde_json::from_value(json!({ "channel_id": 42 })).expect("number");
        let b: Args = serde_json::from_value(json!({ "channel_id": "42" })).expect("string");
        assert_eq!(a.channel_id, Some(Snowflake(42)));
        assert_eq!(b.channel_id, Some(Snowflake(42)));
    }

    #[test]
    fn snowflake_rejects_zero() {
        // Zero would panic inside serenity's NonZeroU64-backed id types.
        let num: Result<Args, _> = serde_json::from_value(json!({ "channel_id": 0 }));
        let s: Result<Args, _> = serde_json::from_value(json!({ "channel_id": "0" }));
        assert!(num.is_err());
        assert!(s.is_err());
    }

    #[test]
    fn snowflake_rejects_garbage() {
        let r: Result<Args, _> = serde_json::from_value(json!({ "channel_id": "not-an-id" }));
        assert!(r.is_err());
    }

    #[test]
    fn malformed_arguments_surface_as_tool_error() {
        let r: Result<Args, ToolResult> = parse_args(json!({ "channel_id": true }));
        let err = r.err().expect("error result");
        assert!(err.is_error);
        assert!(err.content.contains("Invalid tool arguments"));
    }
}

//! Shared foundation for the Apeiron bot: configuration, the error type,
//! and the chat-domain types every other crate builds on.

pub mod config;
pub mod error;
pub mod health;
pub mod identity;
pub mod message;
pub mod transcript;

pub use config::{AgentConfig, ApeironConfig, DiscordConfig, GatewayConfig};
pub use error::{ApeironError, Result};
pub use health::ConnectionHealth;
pub use identity::{ConversationId, InvocationScope};
pub use message::{ChatMessage, MessageAttachment, MessageAuthor};
pub use transcript::{ContentBlock, Role, TranscriptBuilder, TranscriptTurn, TurnContent};

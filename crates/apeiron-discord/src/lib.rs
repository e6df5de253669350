//! Discord channel adapter: serenity gateway plumbing, routing, history
//! aggregation, response dispatch, and the tool kit lent to the agent.

pub mod adapter;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod history;
pub mod render;
pub mod routing;
pub mod send;
pub mod tools;
pub mod view;

pub use adapter::DiscordAdapter;
pub use error::DiscordError;

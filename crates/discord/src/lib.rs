//! Discord adapter for the Orion relay.
//!
//! Receives gateway events through serenity and renders streamed replies by
//! editing a placeholder message (channels) or a deferred response (slash
//! commands).

pub mod commands;
pub mod handler;
pub mod outbound;

pub use {
    handler::OrionHandler,
    outbound::{ChannelReply, DiscordOutbound, InteractionReply, THINKING_TEXT},
};

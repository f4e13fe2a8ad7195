//! Core of the Orion chat relay.
//!
//! Keeps a short conversation memory per channel, decides which chat messages
//! to answer, and streams a generative backend's reply into the chat by
//! editing one message in place. Platform and backend specifics live behind
//! the [`ChannelOutbound`], [`ReplyTarget`] and [`ResponseSource`] traits.

pub mod activation;
pub mod chunk;
pub mod delivery;
pub mod dispatch;
pub mod error;
pub mod exchange;
pub mod fragment;
pub mod history;
pub mod locks;

pub use {
    activation::ActivationRegistry,
    delivery::{DeliveryConfig, DeliveryController, DeliveryOutcome, ReplyTarget},
    dispatch::{BotIdentity, ChannelOutbound, Dispatch, Dispatcher, InboundMessage},
    error::{Error, Result},
    exchange::{ExchangeState, PendingExchange},
    fragment::{Attachment, FragmentStream, ResponseSource, Role, StreamFragment, Turn},
    history::ConversationStore,
};

//! Routing of inbound chat events to the history, activation and delivery
//! components.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{debug, info, warn},
};

use crate::{
    Result,
    activation::ActivationRegistry,
    delivery::{DeliveryController, DeliveryOutcome, ReplyTarget},
    exchange::{ExchangeState, PendingExchange},
    fragment::{ResponseSource, Turn},
    history::ConversationStore,
    locks::ChannelLocks,
};

pub const ACTIVATE_KEYWORD: &str = "?activate";
pub const DEACTIVATE_KEYWORD: &str = "?deactivate";
pub const CLEAR_KEYWORD: &str = "?clear";

pub const ACTIVATED_TEXT: &str = "✅ Orion Bot is now active in this channel. I will respond to all messages. Use `?deactivate` to turn this off.";
pub const CLEARED_TEXT: &str = "🧹 My memory of our conversation in this channel has been cleared.";
pub const NOTHING_TO_CLEAR_TEXT: &str = "There's no conversation history to clear in this channel!";

pub fn deactivated_text(bot_name: &str) -> String {
    format!("⛔ Orion Bot is no longer active. Mention me (`@{bot_name}`) to chat.")
}

/// Literal control keywords, matched on the whole trimmed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKeyword {
    Activate,
    Deactivate,
    Clear,
}

impl ControlKeyword {
    pub fn parse(content: &str) -> Option<Self> {
        let content = content.trim();
        if content.eq_ignore_ascii_case(ACTIVATE_KEYWORD) {
            Some(Self::Activate)
        } else if content.eq_ignore_ascii_case(DEACTIVATE_KEYWORD) {
            Some(Self::Deactivate)
        } else if content.eq_ignore_ascii_case(CLEAR_KEYWORD) {
            Some(Self::Clear)
        } else {
            None
        }
    }
}

/// The bot's own account, known once the platform session is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: u64,
    pub name: String,
}

/// Platform-neutral view of an inbound chat message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel_id: u64,
    pub author_id: u64,
    pub content: String,
    /// Whether the message explicitly mentions the bot.
    pub mentions_bot: bool,
}

/// Outbound side of the chat platform as seen by the dispatcher.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Send a plain message to a channel.
    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()>;

    /// A fresh reply surface whose anchor will be a new message in the channel.
    fn reply_target(&self, channel_id: u64) -> Box<dyn ReplyTarget>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    OwnMessage,
    NotAddressed,
    EmptyPrompt,
}

/// What the dispatcher did with one inbound message.
#[derive(Debug)]
pub enum Dispatch {
    Ignored(IgnoreReason),
    Activated,
    Deactivated,
    Cleared { had_history: bool },
    Answered {
        outcome: DeliveryOutcome,
        state: ExchangeState,
    },
}

/// Remove `<@id>` and `<@!id>` mentions of the bot and trim.
pub fn strip_mentions(content: &str, bot_user_id: u64) -> String {
    content
        .replace(&format!("<@!{bot_user_id}>"), "")
        .replace(&format!("<@{bot_user_id}>"), "")
        .trim()
        .to_string()
}

/// Long-lived relay context: owns the conversation memory and activation set
/// and drives every exchange with the backend.
pub struct Dispatcher {
    history: ConversationStore,
    activation: ActivationRegistry,
    locks: ChannelLocks,
    source: Arc<dyn ResponseSource>,
    delivery: DeliveryController,
}

impl Dispatcher {
    pub fn new(
        history: ConversationStore,
        source: Arc<dyn ResponseSource>,
        delivery: DeliveryController,
    ) -> Self {
        Self {
            history,
            activation: ActivationRegistry::new(),
            locks: ChannelLocks::new(),
            source,
            delivery,
        }
    }

    pub fn history(&self) -> &ConversationStore {
        &self.history
    }

    pub fn activation(&self) -> &ActivationRegistry {
        &self.activation
    }

    pub fn delivery(&self) -> &DeliveryController {
        &self.delivery
    }

    /// Handle one inbound chat message. Never fails: every error ends as a
    /// chat-visible notice or a log line.
    pub async fn handle_message(
        &self,
        message: &InboundMessage,
        bot: &BotIdentity,
        outbound: &dyn ChannelOutbound,
    ) -> Dispatch {
        if message.author_id == bot.user_id {
            return Dispatch::Ignored(IgnoreReason::OwnMessage);
        }
        let channel_id = message.channel_id;

        if let Some(keyword) = ControlKeyword::parse(&message.content) {
            return self.handle_keyword(keyword, channel_id, bot, outbound).await;
        }

        if !message.mentions_bot && !self.activation.is_active(channel_id) {
            return Dispatch::Ignored(IgnoreReason::NotAddressed);
        }

        let prompt = strip_mentions(&message.content, bot.user_id);
        if prompt.is_empty() {
            return Dispatch::Ignored(IgnoreReason::EmptyPrompt);
        }

        let _turn = self.locks.acquire(channel_id).await;
        let exchange = PendingExchange::begin(&self.history, channel_id, &prompt);
        let context = self.history.get(channel_id);
        debug!(
            channel_id,
            turns = context.len(),
            source = self.source.name(),
            "starting exchange"
        );

        let mut target = outbound.reply_target(channel_id);
        let outcome = self
            .delivery
            .deliver(target.as_mut(), self.source.stream(context))
            .await;

        let state = match outcome.committed_text() {
            Some(text) => exchange.commit(text),
            None => exchange.rollback(),
        };
        info!(channel_id, state = ?state, "exchange finished");

        Dispatch::Answered { outcome, state }
    }

    /// Answer a single prompt without reading or writing any history.
    pub async fn search(&self, prompt: &str, target: &mut dyn ReplyTarget) -> DeliveryOutcome {
        debug!(prompt_len = prompt.len(), "single-shot query");
        let context = vec![Turn::user(prompt)];
        self.delivery
            .deliver(target, self.source.stream(context))
            .await
    }

    async fn handle_keyword(
        &self,
        keyword: ControlKeyword,
        channel_id: u64,
        bot: &BotIdentity,
        outbound: &dyn ChannelOutbound,
    ) -> Dispatch {
        let (dispatch, reply) = match keyword {
            ControlKeyword::Activate => {
                self.activation.activate(channel_id);
                (Dispatch::Activated, ACTIVATED_TEXT.to_string())
            },
            ControlKeyword::Deactivate => {
                self.activation.deactivate(channel_id);
                (Dispatch::Deactivated, deactivated_text(&bot.name))
            },
            ControlKeyword::Clear => {
                // Waits for an in-flight exchange so its commit cannot land
                // in a freshly cleared history.
                let _turn = self.locks.acquire(channel_id).await;
                let had_history = self.history.clear(channel_id);
                let reply = if had_history {
                    CLEARED_TEXT
                } else {
                    NOTHING_TO_CLEAR_TEXT
                };
                (Dispatch::Cleared { had_history }, reply.to_string())
            },
        };
        info!(channel_id, keyword = ?keyword, "control keyword handled");

        if let Err(e) = outbound.send_text(channel_id, &reply).await {
            warn!(channel_id, error = %e, "failed to send keyword confirmation");
        }
        dispatch
    }
}

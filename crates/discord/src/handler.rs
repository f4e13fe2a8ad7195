//! Discord event handler for serenity.
//!
//! Turns gateway events into relay dispatches: chat messages go to
//! [`Dispatcher::handle_message`], slash commands to `/search` and `/help`.

use std::sync::{Arc, RwLock};

use {
    orion_relay::{BotIdentity, Dispatch, Dispatcher, InboundMessage},
    serenity::{
        all::{
            ActivityData, Command, CommandInteraction, Context, CreateInteractionResponse,
            CreateInteractionResponseMessage, EventHandler, GatewayIntents, Interaction, Message,
            OnlineStatus, Ready,
        },
        async_trait,
    },
    tracing::{debug, info, warn},
};

use crate::{
    commands::{self, HELP_COMMAND, PRESENCE_TEXT, SEARCH_COMMAND},
    outbound::{DiscordOutbound, InteractionReply},
};

/// Handler for Discord gateway events.
pub struct OrionHandler {
    dispatcher: Arc<Dispatcher>,
    identity: RwLock<Option<BotIdentity>>,
}

impl OrionHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            identity: RwLock::new(None),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    fn identity(&self) -> Option<BotIdentity> {
        self.identity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_identity(&self, identity: BotIdentity) {
        *self.identity.write().unwrap_or_else(|e| e.into_inner()) = Some(identity);
    }

    async fn search(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(prompt) = commands::prompt_option(&command.data.options) else {
            warn!(user_id = command.user.id.get(), "search command without prompt");
            return;
        };
        info!(
            user_id = command.user.id.get(),
            prompt_len = prompt.len(),
            "search command"
        );

        let mut reply = InteractionReply::new(&ctx.http, command);
        let outcome = self.dispatcher.search(prompt, &mut reply).await;
        debug!(outcome = ?outcome, "search command finished");
    }

    async fn help(&self, ctx: &Context, command: &CommandInteraction) {
        let bot_name = self
            .identity()
            .map(|bot| bot.name)
            .unwrap_or_else(|| "Orion".into());
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .embed(commands::help_embed(&bot_name))
                .ephemeral(true),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            warn!(error = %e, "failed to send help response");
        }
    }
}

#[async_trait]
impl EventHandler for OrionHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        self.set_identity(BotIdentity {
            user_id: ready.user.id.get(),
            name: ready.user.name.clone(),
        });

        match Command::set_global_commands(&ctx.http, commands::global_commands()).await {
            Ok(registered) => info!(count = registered.len(), "slash commands synced"),
            Err(e) => warn!(error = %e, "failed to sync slash commands"),
        }

        ctx.set_presence(
            Some(ActivityData::listening(PRESENCE_TEXT)),
            OnlineStatus::Online,
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let Some(bot) = self.identity() else {
            debug!("message before ready, skipping");
            return;
        };

        let inbound = InboundMessage {
            channel_id: msg.channel_id.get(),
            author_id: msg.author.id.get(),
            mentions_bot: msg.mentions.iter().any(|u| u.id.get() == bot.user_id),
            content: msg.content,
        };
        let outbound = DiscordOutbound::new(Arc::clone(&ctx.http));

        match self
            .dispatcher
            .handle_message(&inbound, &bot, &outbound)
            .await
        {
            Dispatch::Ignored(reason) => {
                debug!(channel_id = inbound.channel_id, reason = ?reason, "message ignored");
            },
            dispatch => {
                debug!(channel_id = inbound.channel_id, dispatch = ?dispatch, "message handled");
            },
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        match command.data.name.as_str() {
            SEARCH_COMMAND => self.search(&ctx, &command).await,
            HELP_COMMAND => self.help(&ctx, &command).await,
            other => debug!(command = other, "unknown command"),
        }
    }
}

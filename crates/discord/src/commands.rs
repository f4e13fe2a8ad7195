//! Global application commands and the `/help` embed.

use serenity::all::{
    CommandDataOption, CommandOptionType, Colour, CreateCommand, CreateCommandOption, CreateEmbed,
    CreateEmbedFooter, InstallationContext, InteractionContext,
};

pub const SEARCH_COMMAND: &str = "search";
pub const HELP_COMMAND: &str = "help";
pub const PROMPT_OPTION: &str = "prompt";

/// Presence text shown as "Listening to ...".
pub const PRESENCE_TEXT: &str = "for @mentions and /help";

fn everywhere(command: CreateCommand) -> CreateCommand {
    command
        .contexts(vec![
            InteractionContext::Guild,
            InteractionContext::BotDm,
            InteractionContext::PrivateChannel,
        ])
        .integration_types(vec![InstallationContext::Guild, InstallationContext::User])
}

/// Commands registered globally on ready.
pub fn global_commands() -> Vec<CreateCommand> {
    vec![
        everywhere(
            CreateCommand::new(SEARCH_COMMAND)
                .description("Search for information without using conversation history.")
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        PROMPT_OPTION,
                        "The question you want to ask.",
                    )
                    .required(true),
                ),
        ),
        everywhere(
            CreateCommand::new(HELP_COMMAND)
                .description("Shows the bot's help and command information."),
        ),
    ]
}

/// The `prompt` string of a `/search` invocation, if present.
pub fn prompt_option(options: &[CommandDataOption]) -> Option<&str> {
    options
        .iter()
        .find(|option| option.name == PROMPT_OPTION)
        .and_then(|option| option.value.as_str())
}

pub fn help_embed(bot_name: &str) -> CreateEmbed {
    CreateEmbed::new()
        .title("Orion Bot Help")
        .description("I am a friendly, concise chatbot created by Geetansh Jangid.")
        .colour(Colour::TEAL)
        .field(
            "💬 Conversational Chat",
            format!(
                "Mention me with your question!\n**Example:** `@{bot_name} what is a black hole?`"
            ),
            false,
        )
        .field(
            "🚀 Slash Commands",
            "`/search [prompt]` - Get a direct answer to a single question (no memory).\n\
             `/help` - Shows this help message.",
            false,
        )
        .field(
            "👂 Activation Commands",
            "`?activate` - I will listen to all messages in this channel without being tagged.\n\
             `?deactivate` - I will stop listening to all messages.\n\
             `?clear` - Clears my conversation memory in this channel.",
            false,
        )
        .footer(CreateEmbedFooter::new("Orion, made by Geetansh Jangid"))
}

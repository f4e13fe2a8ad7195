use std::sync::Arc;

use {
    async_trait::async_trait,
    orion_relay::{Attachment, ChannelOutbound, Error, ReplyTarget, Result},
    serenity::all::{
        ChannelId, CommandInteraction, CreateAttachment, CreateInteractionResponseFollowup,
        CreateMessage, EditInteractionResponse, EditMessage, Http, MessageId,
    },
    tracing::debug,
};

/// Placeholder posted before the first fragment arrives.
pub const THINKING_TEXT: &str = "Thinking... 🤔";

fn platform(context: &'static str) -> impl FnOnce(serenity::Error) -> Error {
    move |e| Error::platform(context, e)
}

fn to_files(attachments: Vec<Attachment>) -> Vec<CreateAttachment> {
    attachments
        .into_iter()
        .map(|a| CreateAttachment::bytes(a.data, a.filename))
        .collect()
}

/// Outbound Discord operations for plain channel messages.
#[derive(Clone)]
pub struct DiscordOutbound {
    http: Arc<Http>,
}

impl DiscordOutbound {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChannelOutbound for DiscordOutbound {
    async fn send_text(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map_err(platform("send message"))?;
        Ok(())
    }

    fn reply_target(&self, channel_id: u64) -> Box<dyn ReplyTarget> {
        Box::new(ChannelReply::new(
            Arc::clone(&self.http),
            ChannelId::new(channel_id),
        ))
    }
}

/// Streams one reply into a channel by editing a "Thinking..." message.
pub struct ChannelReply {
    http: Arc<Http>,
    channel_id: ChannelId,
    anchor: Option<MessageId>,
}

impl ChannelReply {
    pub fn new(http: Arc<Http>, channel_id: ChannelId) -> Self {
        Self {
            http,
            channel_id,
            anchor: None,
        }
    }
}

#[async_trait]
impl ReplyTarget for ChannelReply {
    async fn send_placeholder(&mut self) -> Result<()> {
        let message = self
            .channel_id
            .say(&self.http, THINKING_TEXT)
            .await
            .map_err(platform("send placeholder"))?;
        debug!(channel_id = self.channel_id.get(), message_id = message.id.get(), "placeholder sent");
        self.anchor = Some(message.id);
        Ok(())
    }

    async fn edit(&mut self, content: &str) -> Result<()> {
        let Some(anchor) = self.anchor else {
            // Nothing to edit yet: the content becomes the anchor.
            let message = self
                .channel_id
                .say(&self.http, content)
                .await
                .map_err(platform("send message"))?;
            self.anchor = Some(message.id);
            return Ok(());
        };
        self.channel_id
            .edit_message(&self.http, anchor, EditMessage::new().content(content))
            .await
            .map_err(platform("edit message"))?;
        Ok(())
    }

    async fn send_text(&mut self, content: &str) -> Result<()> {
        self.channel_id
            .say(&self.http, content)
            .await
            .map_err(platform("send message"))?;
        Ok(())
    }

    async fn send_attachments(&mut self, attachments: Vec<Attachment>) -> Result<()> {
        if attachments.is_empty() {
            return Ok(());
        }
        self.channel_id
            .send_message(&self.http, CreateMessage::new().add_files(to_files(attachments)))
            .await
            .map_err(platform("send attachments"))?;
        Ok(())
    }
}

/// Streams one reply into a deferred slash-command response.
pub struct InteractionReply<'a> {
    http: &'a Http,
    interaction: &'a CommandInteraction,
}

impl<'a> InteractionReply<'a> {
    pub fn new(http: &'a Http, interaction: &'a CommandInteraction) -> Self {
        Self { http, interaction }
    }
}

#[async_trait]
impl ReplyTarget for InteractionReply<'_> {
    async fn send_placeholder(&mut self) -> Result<()> {
        self.interaction
            .defer(self.http)
            .await
            .map_err(platform("defer interaction"))
    }

    async fn edit(&mut self, content: &str) -> Result<()> {
        self.interaction
            .edit_response(self.http, EditInteractionResponse::new().content(content))
            .await
            .map_err(platform("edit interaction response"))?;
        Ok(())
    }

    async fn send_text(&mut self, content: &str) -> Result<()> {
        self.interaction
            .create_followup(
                self.http,
                CreateInteractionResponseFollowup::new().content(content),
            )
            .await
            .map_err(platform("send followup"))?;
        Ok(())
    }

    async fn send_attachments(&mut self, attachments: Vec<Attachment>) -> Result<()> {
        if attachments.is_empty() {
            return Ok(());
        }
        self.interaction
            .create_followup(
                self.http,
                CreateInteractionResponseFollowup::new().add_files(to_files(attachments)),
            )
            .await
            .map_err(platform("send followup attachments"))?;
        Ok(())
    }
}

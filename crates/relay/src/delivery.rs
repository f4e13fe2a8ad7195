//! Progressive edit-in-place delivery of a fragment stream.
//!
//! One anchor message is edited as text accumulates, at most once per
//! `edit_every_chars` characters. The complete text always goes out in a final
//! edit, and attachments follow in a single message once the text is settled.

use std::time::Duration;

use {
    async_trait::async_trait,
    futures::StreamExt,
    tracing::{debug, info, warn},
};

use crate::{
    Error, Result,
    chunk::{chunk_message, truncate_chars},
    fragment::{Attachment, FragmentStream, StreamFragment},
};

/// Shown when the stream finished without any text.
pub const EMPTY_RESPONSE_TEXT: &str =
    "I've processed the request, but there's no text output to display.";

/// Shown when the stream or the platform failed mid-exchange.
pub const ERROR_RESPONSE_TEXT: &str = "I'm sorry, an error occurred while processing your request.";

/// Discord's per-message content limit.
pub const DISCORD_MAX_MESSAGE_CHARS: usize = 2000;

/// A chat surface that can host one streamed reply.
///
/// Implementations own the anchor message: `send_placeholder` creates it,
/// `edit` replaces its content. `send_text` always creates a new message.
#[async_trait]
pub trait ReplyTarget: Send {
    /// Create the anchor that later edits apply to.
    async fn send_placeholder(&mut self) -> Result<()>;

    /// Replace the anchor's content.
    async fn edit(&mut self, content: &str) -> Result<()>;

    /// Send `content` as a new message.
    async fn send_text(&mut self, content: &str) -> Result<()>;

    /// Send every attachment in one follow-up message.
    async fn send_attachments(&mut self, attachments: Vec<Attachment>) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct DeliveryConfig {
    /// Characters that must accumulate between two progressive edits.
    pub edit_every_chars: usize,
    /// Platform limit for one message; longer replies overflow into new messages.
    pub max_message_chars: usize,
    /// Longest wait for the next fragment; `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            edit_every_chars: 150,
            max_message_chars: DISCORD_MAX_MESSAGE_CHARS,
            idle_timeout: Some(Duration::from_secs(120)),
        }
    }
}

/// How one delivery ended.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// Text was shown in full; `text` is what the history should remember.
    Delivered { text: String, attachments: usize },
    /// The stream ended without text; the fallback notice was shown.
    Empty { attachments: usize },
    /// The stream or the platform failed; the error notice was shown.
    Failed { error: Error },
}

impl DeliveryOutcome {
    /// The model text to commit, if the exchange produced any.
    pub fn committed_text(&self) -> Option<&str> {
        match self {
            Self::Delivered { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryController {
    config: DeliveryConfig,
}

impl DeliveryController {
    pub fn new(config: DeliveryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Drain `stream` into `target`.
    pub async fn deliver(
        &self,
        target: &mut dyn ReplyTarget,
        stream: FragmentStream<'_>,
    ) -> DeliveryOutcome {
        if let Err(error) = target.send_placeholder().await {
            warn!(error = %error, "failed to create reply anchor");
            report_failure(target, false).await;
            return DeliveryOutcome::Failed { error };
        }

        let (text, attachments) = match self.drain(target, stream).await {
            Ok(drained) => drained,
            Err(error) => {
                warn!(error = %error, "response stream failed");
                report_failure(target, true).await;
                return DeliveryOutcome::Failed { error };
            },
        };

        let final_edit = if text.is_empty() {
            target.edit(EMPTY_RESPONSE_TEXT).await
        } else {
            self.finish_text(target, &text).await
        };
        if let Err(error) = final_edit {
            warn!(error = %error, "final edit failed");
            report_failure(target, true).await;
            return DeliveryOutcome::Failed { error };
        }

        let attachment_count = attachments.len();
        if !attachments.is_empty()
            && let Err(e) = target.send_attachments(attachments).await
        {
            warn!(error = %e, attachments = attachment_count, "failed to send attachments");
        }

        info!(
            text_len = text.len(),
            attachments = attachment_count,
            "reply delivered"
        );
        if text.is_empty() {
            DeliveryOutcome::Empty {
                attachments: attachment_count,
            }
        } else {
            DeliveryOutcome::Delivered {
                text,
                attachments: attachment_count,
            }
        }
    }

    async fn drain(
        &self,
        target: &mut dyn ReplyTarget,
        mut stream: FragmentStream<'_>,
    ) -> Result<(String, Vec<Attachment>)> {
        let every = self.config.edit_every_chars.max(1);
        let mut text = String::new();
        let mut chars = 0usize;
        let mut next_edit_at = every;
        let mut attachments = Vec::new();

        loop {
            let next = match self.config.idle_timeout {
                Some(after) => tokio::time::timeout(after, stream.next())
                    .await
                    .map_err(|_| Error::StreamTimeout { after })?,
                None => stream.next().await,
            };

            match next {
                None => break,
                Some(Ok(StreamFragment::Text(delta))) => {
                    if delta.is_empty() {
                        continue;
                    }
                    text.push_str(&delta);
                    chars += delta.chars().count();
                    if chars >= next_edit_at {
                        let display = truncate_chars(&text, self.config.max_message_chars);
                        if let Err(e) = target.edit(display).await {
                            warn!(error = %e, "progressive edit failed");
                        }
                        next_edit_at = chars + every;
                    }
                },
                Some(Ok(StreamFragment::Attachment(attachment))) => {
                    debug!(filename = %attachment.filename, "attachment received");
                    attachments.push(attachment);
                },
                Some(Err(e)) => return Err(e),
            }
        }

        Ok((text, attachments))
    }

    async fn finish_text(&self, target: &mut dyn ReplyTarget, text: &str) -> Result<()> {
        let chunks = chunk_message(text, self.config.max_message_chars);
        let Some((first, rest)) = chunks.split_first() else {
            return Ok(());
        };
        target.edit(first).await?;
        for chunk in rest {
            target.send_text(chunk).await?;
        }
        Ok(())
    }
}

async fn report_failure(target: &mut dyn ReplyTarget, anchored: bool) {
    let sent = if anchored {
        target.edit(ERROR_RESPONSE_TEXT).await
    } else {
        target.send_text(ERROR_RESPONSE_TEXT).await
    };
    if let Err(e) = sent {
        warn!(error = %e, "failed to show error notice");
    }
}

/// In-memory [`ReplyTarget`] that records every call, for tests.
#[cfg(test)]
pub(crate) mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Placeholder,
        Edit(String),
        Send(String),
        Attachments(Vec<String>),
    }

    #[derive(Debug, Default)]
    pub struct RecordingTarget {
        pub calls: Vec<Call>,
        pub fail_placeholder: bool,
        pub fail_edits: bool,
    }

    impl RecordingTarget {
        /// Content of the anchor after the last edit.
        pub fn anchor_text(&self) -> Option<&str> {
            self.calls.iter().rev().find_map(|c| match c {
                Call::Edit(text) => Some(text.as_str()),
                _ => None,
            })
        }

        pub fn edits(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::Edit(_)))
                .count()
        }

        fn failure() -> Error {
            Error::platform("recording", std::io::Error::other("rejected"))
        }
    }

    #[async_trait]
    impl ReplyTarget for RecordingTarget {
        async fn send_placeholder(&mut self) -> Result<()> {
            if self.fail_placeholder {
                return Err(Self::failure());
            }
            self.calls.push(Call::Placeholder);
            Ok(())
        }

        async fn edit(&mut self, content: &str) -> Result<()> {
            if self.fail_edits {
                return Err(Self::failure());
            }
            self.calls.push(Call::Edit(content.to_string()));
            Ok(())
        }

        async fn send_text(&mut self, content: &str) -> Result<()> {
            self.calls.push(Call::Send(content.to_string()));
            Ok(())
        }

        async fn send_attachments(&mut self, attachments: Vec<Attachment>) -> Result<()> {
            self.calls.push(Call::Attachments(
                attachments.into_iter().map(|a| a.filename).collect(),
            ));
            Ok(())
        }
    }
}

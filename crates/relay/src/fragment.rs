//! Conversation turns, stream fragments and the response source contract.

use std::pin::Pin;

use {
    futures::Stream,
    serde::{Deserialize, Serialize},
};

use crate::Result;

/// Author of a conversation turn, named the way the backend names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One message in a channel's conversation memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Binary output produced alongside the text, e.g. a rendered chart.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub filename: String,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("len", &self.data.len())
            .finish()
    }
}

/// One unit of streamed output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    Text(String),
    Attachment(Attachment),
}

/// Lazy, finite, non-restartable sequence of fragments. An `Err` item is
/// terminal: the source yields nothing after it.
pub type FragmentStream<'a> = Pin<Box<dyn Stream<Item = Result<StreamFragment>> + Send + 'a>>;

/// A generative backend that turns a conversation into streamed fragments.
///
/// Implementations hold no conversation memory: every call carries the full
/// context it should answer.
pub trait ResponseSource: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Start generating a reply to `context`. Nothing is sent upstream until
    /// the returned stream is first polled.
    fn stream(&self, context: Vec<Turn>) -> FragmentStream<'_>;
}

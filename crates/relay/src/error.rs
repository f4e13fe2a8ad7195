use std::{error::Error as StdError, time::Duration};

/// Crate-wide result type for relay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed relay errors shared by the stream adapter, reply targets and dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The generative backend failed while producing a response.
    #[error("response stream failed: {message}")]
    Stream { message: String },

    /// No fragment arrived within the configured idle window.
    #[error("response stream idle for {}s", after.as_secs())]
    StreamTimeout { after: Duration },

    /// A chat platform call (send, edit, follow-up) failed.
    #[error("platform call failed: {context}: {source}")]
    Platform {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Wrapped source error from an external dependency.
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn stream(message: impl std::fmt::Display) -> Self {
        Self::Stream {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn platform(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Platform {
            context: context.into(),
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

use std::time::Duration;

use secrecy::Secret;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HISTORY_TURNS: usize = 40;
pub const DEFAULT_EDIT_EVERY_CHARS: usize = 150;
pub const DEFAULT_STREAM_IDLE_TIMEOUT_SECS: u64 = 120;

/// Process settings read once at startup.
///
/// `None` in an optional backend field means "use the backend default".
#[derive(Clone)]
pub struct OrionConfig {
    pub discord_token: Secret<String>,
    pub gemini_api_key: Secret<String>,
    pub port: u16,
    pub gemini_model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub system_instruction: Option<String>,
    /// Turns kept per channel; `None` keeps everything.
    pub history_turns: Option<usize>,
    pub edit_every_chars: usize,
    /// `None` disables the idle timeout.
    pub stream_idle_timeout: Option<Duration>,
}

impl std::fmt::Debug for OrionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrionConfig")
            .field("discord_token", &"[REDACTED]")
            .field("gemini_api_key", &"[REDACTED]")
            .field("port", &self.port)
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("system_instruction", &self.system_instruction.is_some())
            .field("history_turns", &self.history_turns)
            .field("edit_every_chars", &self.edit_every_chars)
            .field("stream_idle_timeout", &self.stream_idle_timeout)
            .finish()
    }
}

use std::{str::FromStr, time::Duration};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    error::{ConfigError, Result},
    schema::{
        DEFAULT_EDIT_EVERY_CHARS, DEFAULT_HISTORY_TURNS, DEFAULT_PORT,
        DEFAULT_STREAM_IDLE_TIMEOUT_SECS, OrionConfig,
    },
};

pub const DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const PORT: &str = "PORT";
pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
pub const SYSTEM_INSTRUCTION: &str = "ORION_SYSTEM_INSTRUCTION";
pub const HISTORY_TURNS: &str = "ORION_HISTORY_TURNS";
pub const EDIT_EVERY_CHARS: &str = "ORION_EDIT_EVERY_CHARS";
pub const STREAM_IDLE_TIMEOUT_SECS: &str = "ORION_STREAM_IDLE_TIMEOUT_SECS";

/// Load `.env` if present, then read the process environment.
pub fn load() -> Result<OrionConfig> {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {},
        Err(e) => warn!(error = %e, "failed to read .env, continuing with process environment"),
    }
    from_lookup(|name| std::env::var(name).ok())
}

/// Build the config from an arbitrary variable lookup.
///
/// Separate from [`load`] so it can be tested without touching the process
/// environment.
pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<OrionConfig> {
    let discord_token = required(&lookup, DISCORD_TOKEN)?;
    let gemini_api_key = required(&lookup, GEMINI_API_KEY)?;

    let history_turns = match parsed(&lookup, HISTORY_TURNS, "non-negative integer")? {
        Some(0) => None,
        Some(n) => Some(n),
        None => Some(DEFAULT_HISTORY_TURNS),
    };

    let edit_every_chars = match parsed::<usize>(&lookup, EDIT_EVERY_CHARS, "positive integer")? {
        Some(0) => {
            return Err(ConfigError::Invalid {
                name: EDIT_EVERY_CHARS,
                value: "0".into(),
                expected: "positive integer",
            });
        },
        Some(n) => n,
        None => DEFAULT_EDIT_EVERY_CHARS,
    };

    let stream_idle_timeout = match parsed(&lookup, STREAM_IDLE_TIMEOUT_SECS, "number of seconds")? {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(Duration::from_secs(DEFAULT_STREAM_IDLE_TIMEOUT_SECS)),
    };

    Ok(OrionConfig {
        discord_token: Secret::new(discord_token),
        gemini_api_key: Secret::new(gemini_api_key),
        port: parsed(&lookup, PORT, "port number")?.unwrap_or(DEFAULT_PORT),
        gemini_model: optional(&lookup, GEMINI_MODEL),
        gemini_base_url: optional(&lookup, GEMINI_BASE_URL),
        system_instruction: lookup(SYSTEM_INSTRUCTION),
        history_turns,
        edit_every_chars,
        stream_idle_timeout,
    })
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String> {
    match lookup(name) {
        None => Err(ConfigError::Missing { name }),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Blank { name }),
        Some(value) => Ok(value.trim().to_string()),
    }
}

/// Set and non-blank, trimmed.
fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>> {
    let Some(value) = optional(lookup, name) else {
        return Ok(None);
    };
    value
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected,
        })
}

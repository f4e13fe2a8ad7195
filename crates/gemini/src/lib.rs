//! Gemini `streamGenerateContent` client exposed as a relay response source.
//!
//! Requests carry the whole conversation plus the configured system
//! instruction and tools. The SSE reply is decoded incrementally into text
//! and image fragments.

pub mod config;
pub mod provider;
pub mod request;
pub mod response;
pub mod sse;

pub use {
    config::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION, GeminiConfig, ToolConfig},
    provider::GeminiProvider,
};

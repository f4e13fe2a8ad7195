use secrecy::{ExposeSecret, Secret};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "\
you are a friendly chatbot which always answer in a very consise way answering only what is asked
you must search the web to answer each and every question
you must print the list of sources which you used to answer the query.
always use latex and markdown to make you answers stand out
draw graphs(always execute matplotlib code to draw graphs) and tables to simplify things
you are orion bot created by Geetansh Jangid, you are not created by google.";

/// Server-side tools the model may call while answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolConfig {
    pub google_search: bool,
    pub code_execution: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            google_search: true,
            code_execution: true,
        }
    }
}

/// Connection and prompt settings for [`GeminiProvider`](crate::GeminiProvider).
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub system_instruction: String,
    pub tools: ToolConfig,
}

impl GeminiConfig {
    /// Defaults for everything but the key.
    pub fn new(api_key: Secret<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.into(),
            tools: ToolConfig::default(),
        }
    }

    pub(crate) fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_uses_sse_endpoint() {
        let mut cfg = GeminiConfig::new(Secret::new("k".into()));
        cfg.base_url = "http://localhost:1234/".into();
        cfg.model = "gemini-test".into();
        assert_eq!(
            cfg.stream_url(),
            "http://localhost:1234/v1beta/models/gemini-test:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = GeminiConfig::new(Secret::new("super-secret".into()));
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains(DEFAULT_MODEL));
    }
}

pub mod azure;
pub mod error;

pub use error::CompletionError;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 800,
        }
    }
}

impl CompletionOptions {
    /// Env overrides follow the same names the original deployment used.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let temperature = std::env::var("AZURE_OPENAI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse::<f32>().ok())
            .unwrap_or(defaults.temperature);
        let max_tokens = std::env::var("AZURE_OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_tokens);
        Self {
            temperature,
            max_tokens,
        }
    }
}

/// Narrow capability boundary around the hosted completion service: text in,
/// text out. The analytics and chat paths both depend on this trait so tests
/// can substitute a deterministic stub with no network access.
#[async_trait::async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, CompletionError>;

    /// Two-message form used by the analytics pipeline: fixed persona plus a
    /// single user prompt.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_prompt),
        ];
        self.complete_chat(&messages, options).await
    }
}

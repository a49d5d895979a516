//! # LLM gateway
//!
//! Synchronous request/response bridge to a chat-completion provider. Defines the
//! [`LlmGateway`] trait and the [`DeepSeekGateway`] implementation (OpenAI-compatible
//! `/chat/completions` over reqwest).
//!
//! Every call sends a single message with the given [`MessageRole`] and returns the first
//! completion's text. Calls carry an explicit deadline and are never retried.

use async_trait::async_trait;

mod config;
mod deepseek;
mod error;

pub use config::{GatewayConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
pub use deepseek::DeepSeekGateway;
pub use error::GatewayError;
pub use prompt::MessageRole;

/// Outbound integration point to the LLM provider.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Sends `prompt` as one message with `role`; returns the reply text.
    async fn complete(&self, prompt: &str, role: MessageRole) -> Result<String, GatewayError>;
}

/// Masks an API key for logging: first 7 + `***` + last 4; keys of 11 chars or fewer become `***`.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

//! DeepSeek (OpenAI-compatible) implementation of [`LlmGateway`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::{mask_token, LlmGateway, MessageRole};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Gateway over the provider's `/chat/completions` endpoint.
#[derive(Clone)]
pub struct DeepSeekGateway {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl DeepSeekGateway {
    /// Builds the HTTP client with the configured deadline.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        info!(
            endpoint = %config.endpoint(),
            model = %config.model,
            api_key = %mask_token(&config.api_key),
            timeout_secs = config.timeout.as_secs(),
            "LLM gateway configured"
        );

        Ok(Self {
            endpoint: config.endpoint(),
            api_key: config.api_key,
            model: config.model,
            timeout_secs: config.timeout.as_secs(),
            http,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(self.timeout_secs)
        } else {
            GatewayError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl LlmGateway for DeepSeekGateway {
    #[instrument(skip(self, prompt), fields(role = %role, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, role: MessageRole) -> Result<String, GatewayError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: role.as_str(),
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "LLM provider returned error status");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(GatewayError::EmptyChoices)?
            .message
            .content
            .ok_or_else(|| GatewayError::Malformed("choice has no content".to_string()))?;

        debug!(reply_len = reply.len(), "LLM reply received");
        Ok(reply)
    }
}

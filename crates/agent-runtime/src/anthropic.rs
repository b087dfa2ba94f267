//! Anthropic LLM Provider
//!
//! Implementation of `LlmProvider` for the Anthropic Messages API.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo,
        ProviderInfo, TokenUsage,
    },
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// API version header required by the Messages API
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const RETRY_DELAY_SECS: u64 = 2;

/// Anthropic provider configuration
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key (`x-api-key` header)
    pub api_key: String,

    /// API base URL (override for testing)
    pub base_url: String,

    /// Default model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout_secs: 120,
        }
    }
}

impl AnthropicConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| AgentError::Config("ANTHROPIC_API_KEY not set".into()))?;
        let base_url = std::env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let model = std::env::var("CLAUDE_MODEL")
            .unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self {
            api_key,
            base_url,
            model,
            ..Default::default()
        })
    }
}

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicProvider {
    /// Create a new provider with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(AnthropicConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: AnthropicConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(AnthropicConfig::from_env()?)
    }

    /// The configured default model
    pub fn default_model(&self) -> &str {
        &self.config.model
    }

    /// Split agent messages into the Messages API shape: system prompts are
    /// folded into the top-level `system` field, the rest become turns.
    fn convert_messages(
        messages: &[Message],
        options: &GenerationOptions,
    ) -> (Option<String>, Vec<WireMessage>) {
        let mut system_parts: Vec<String> = Vec::new();
        if let Some(prompt) = &options.system_prompt {
            system_parts.push(prompt.clone());
        }

        let mut turns = Vec::new();
        for message in messages {
            match message.role {
                Role::System => system_parts.push(message.content.clone()),
                Role::User => turns.push(WireMessage {
                    role: "user",
                    content: message.content.clone(),
                }),
                Role::Assistant => turns.push(WireMessage {
                    role: "assistant",
                    content: message.content.clone(),
                }),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, turns)
    }

    fn convert_stop_reason(reason: Option<&str>) -> Option<FinishReason> {
        reason.map(|r| match r {
            "end_turn" => FinishReason::Stop,
            "max_tokens" => FinishReason::Length,
            "stop_sequence" => FinishReason::StopSequence,
            _ => FinishReason::Error,
        })
    }

    /// Map a transport-level failure to an agent error
    fn transport_error(err: reqwest::Error) -> AgentError {
        if err.is_timeout() || err.is_connect() {
            AgentError::ProviderUnavailable(err.to_string())
        } else {
            AgentError::Provider(err.to_string())
        }
    }

    /// Map a non-success HTTP status + body to an agent error
    fn api_error(status: reqwest::StatusCode, body: &str) -> AgentError {
        let message = serde_json::from_str::<ApiErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| {
                let mut snippet = body.to_string();
                snippet.truncate(200);
                snippet
            });

        match status.as_u16() {
            401 | 403 => AgentError::Auth(message),
            429 => AgentError::RateLimited(message),
            500..=599 => AgentError::ProviderUnavailable(message),
            _ => AgentError::Provider(format!("{}: {}", status, message)),
        }
    }

    async fn send_messages(&self, request: &MessagesRequest<'_>) -> Result<Completion> {
        let url = format!("{}/v1/messages", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::api_error(status, &body));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("malformed Messages response: {}", e)))?;

        let content: String = body
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .map(|block| block.text.as_str())
            .collect();

        if content.is_empty() {
            return Err(AgentError::Parse("completion contained no text blocks".into()));
        }

        Ok(Completion {
            content,
            model: body.model,
            usage: body.usage.map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
                total_tokens: u.input_tokens + u.output_tokens,
            }),
            finish_reason: Self::convert_stop_reason(body.stop_reason.as_deref()),
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "Anthropic".into(),
            version: Some(ANTHROPIC_VERSION.into()),
            models,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/v1/models?limit=1", self.config.base_url);

        match self
            .client
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
        {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Anthropic health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let (system, turns) = Self::convert_messages(messages, options);

        let request = MessagesRequest {
            model: &options.model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            system,
            messages: turns,
        };

        // One retry on transient failures (overload, rate limit)
        let mut retried = false;
        loop {
            match self.send_messages(&request).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_retryable() && !retried => {
                    retried = true;
                    tracing::warn!("retrying after provider error: {}", e);
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAY_SECS)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/v1/models", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::api_error(status, &body));
        }

        let body: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("malformed models response: {}", e)))?;

        Ok(body
            .data
            .into_iter()
            .map(|m| ModelInfo {
                id: m.id,
                name: m.display_name,
            })
            .collect())
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        // Claude tokenization averages roughly 4 chars per token for English
        (text.len() / 4) as u32
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<WireMessage>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: String,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct WireUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ModelsResponse {
    data: Vec<WireModel>,
}

#[derive(Deserialize)]
struct WireModel {
    id: String,
    display_name: String,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

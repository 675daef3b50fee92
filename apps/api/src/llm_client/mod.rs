/// LLM Client — the single point of entry for all provider calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through this module.
///
/// One `LlmClient` wraps exactly one provider (Anthropic or OpenAI wire
/// shape). There are no retries at this layer: every caller either holds
/// deterministic fallback data or treats the failure as fatal, so retry
/// policy belongs to them.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::debug;

pub mod parse;
pub mod prompts;
pub mod sanitize;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub const ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
pub const OPENAI_MODEL: &str = "gpt-4o";

const DEFAULT_MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM response did not contain parseable JSON")]
    Unparseable,
}

/// Which provider wire protocol a client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One role/content message in a chat-completion request.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Per-call knobs. Analysis and classification run at low temperature to
/// favor determinism; generators run at the default.
#[derive(Debug, Clone, Copy)]
pub struct CallOpts {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CallOpts {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl CallOpts {
    /// Low-temperature options for calls that must be near-deterministic.
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// A chat-completion client bound to one provider and model.
///
/// Constructed explicitly and injected through `AppState` — never a
/// module-level global — so tests can substitute doubles.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    kind: ProviderKind,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(kind: ProviderKind, api_key: String, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            kind,
            api_key,
            model: model.into(),
        }
    }

    pub fn anthropic(api_key: String) -> Self {
        Self::new(ProviderKind::Anthropic, api_key, ANTHROPIC_MODEL)
    }

    pub fn openai(api_key: String) -> Self {
        Self::new(ProviderKind::OpenAi, api_key, OPENAI_MODEL)
    }

    pub fn provider_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one chat-completion request and returns the raw text reply.
    pub async fn call(&self, messages: &[ChatMessage], opts: CallOpts) -> Result<String, LlmError> {
        match self.kind {
            ProviderKind::Anthropic => self.call_anthropic(messages, opts).await,
            ProviderKind::OpenAi => self.call_openai(messages, opts).await,
        }
    }

    /// Calls the LLM and parses the reply as JSON, tolerating code fences and
    /// surrounding prose. The prompt must instruct the model to return JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        messages: &[ChatMessage],
        opts: CallOpts,
    ) -> Result<T, LlmError> {
        let text = self.call(messages, opts).await?;
        let value = parse::safe_json_value(&text).ok_or(LlmError::Unparseable)?;
        serde_json::from_value(value).map_err(LlmError::Parse)
    }

    async fn call_anthropic(
        &self,
        messages: &[ChatMessage],
        opts: CallOpts,
    ) -> Result<String, LlmError> {
        // Anthropic takes the system prompt as a top-level field.
        let system: String = messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let wire: Vec<WireMessage> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| WireMessage {
                role: match m.role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                },
                content: &m.content,
            })
            .collect();

        let body = json!({
            "model": self.model,
            "max_tokens": opts.max_tokens,
            "temperature": opts.temperature,
            "system": system,
            "messages": wire,
        });

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: AnthropicResponse = response.json().await?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        parsed
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.clone())
            .ok_or(LlmError::EmptyContent)
    }

    async fn call_openai(
        &self,
        messages: &[ChatMessage],
        opts: CallOpts,
    ) -> Result<String, LlmError> {
        let wire: Vec<WireMessage> = messages
            .iter()
            .map(|m| WireMessage {
                role: match m.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                },
                content: &m.content,
            })
            .collect();

        let body = json!({
            "model": self.model,
            "max_tokens": opts.max_tokens,
            "temperature": opts.temperature,
            "messages": wire,
        });

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OpenAiResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_names() {
        assert_eq!(ProviderKind::Anthropic.name(), "anthropic");
        assert_eq!(ProviderKind::OpenAi.name(), "openai");
    }

    #[test]
    fn test_deterministic_opts_low_temperature() {
        let opts = CallOpts::deterministic();
        assert!(opts.temperature <= 0.3);
    }

    #[test]
    fn test_anthropic_response_text_extraction_shape() {
        let json = r#"{
            "content": [
                {"type": "text", "text": "hello"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let parsed: AnthropicResponse = serde_json::from_str(json).unwrap();
        let text = parsed
            .content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.clone());
        assert_eq!(text.as_deref(), Some("hello"));
    }

    #[test]
    fn test_openai_response_content_extraction_shape() {
        let json = r#"{"choices": [{"message": {"content": "hi"}}]}"#;
        let parsed: OpenAiResponse = serde_json::from_str(json).unwrap();
        let text = parsed.choices.into_iter().next().and_then(|c| c.message.content);
        assert_eq!(text.as_deref(), Some("hi"));
    }
}

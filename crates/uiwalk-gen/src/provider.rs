//! LLM provider abstraction for case generation and document analysis.
//!
//! Supports DeepSeek and OpenAI through the Chat Completions API, and Anthropic
//! through the Messages API. Uses blocking HTTP via `ureq`; every request is
//! bounded by the configured timeout and is never retried.

use serde_json::Value;
use std::time::Duration;

/// Errors from LLM provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("empty response from LLM")]
    EmptyResponse,
    #[error("unknown provider: '{name}'. Available: {available}")]
    UnknownProvider { name: String, available: String },
}

/// A completed LLM response.
pub struct LlmResponse {
    /// The text content of the response.
    pub text: String,
    /// Input tokens used (from API response, if reported).
    pub input_tokens: Option<u64>,
    /// Output tokens used (from API response, if reported).
    pub output_tokens: Option<u64>,
}

/// Sampling and transport settings shared by every request of a provider.
#[derive(Debug, Clone, Copy)]
pub struct RequestSettings {
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 4096,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Abstraction over LLM API providers.
///
/// Providers are shared read-only across concurrently generated modules.
pub trait LlmProvider: Send + Sync {
    /// Send a completion request with system and user messages, asking for a
    /// JSON object in reply.
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError>;

    /// The model name (for display/logging).
    fn model_name(&self) -> &str;

    /// Cost per million input tokens (USD).
    fn cost_per_mtok_input(&self) -> f64;

    /// Cost per million output tokens (USD).
    fn cost_per_mtok_output(&self) -> f64;
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::Agent::new_with_config(
        ureq::config::Config::builder()
            .timeout_global(Some(timeout))
            .build(),
    )
}

fn map_send_error(err: ureq::Error) -> ProviderError {
    match err {
        ureq::Error::StatusCode(status) => ProviderError::Api {
            status,
            message: format!("request rejected with HTTP {status}"),
        },
        other => ProviderError::Http(other.to_string()),
    }
}

fn api_error(json: &Value) -> Option<ProviderError> {
    let err = json.get("error")?;
    let message = err
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| err.as_str())
        .unwrap_or("unknown error")
        .to_string();
    Some(ProviderError::Api {
        status: 400,
        message,
    })
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

/// Anthropic provider using the Messages API.
#[cfg(feature = "anthropic")]
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    settings: RequestSettings,
    agent: ureq::Agent,
}

#[cfg(feature = "anthropic")]
impl AnthropicProvider {
    pub const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";
    const API_URL: &str = "https://api.anthropic.com/v1/messages";

    pub fn new(api_key: String, model: Option<String>, settings: RequestSettings) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            settings,
            agent: build_agent(settings.timeout),
        }
    }
}

#[cfg(feature = "anthropic")]
impl LlmProvider for AnthropicProvider {
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError> {
        // No JSON mode on the Messages API; the prompts demand a bare JSON object.
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "system": system,
            "messages": [
                {"role": "user", "content": user}
            ]
        });

        let mut response = self
            .agent
            .post(Self::API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .send_json(&body)
            .map_err(map_send_error)?;

        let json: Value = response
            .body_mut()
            .read_json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if let Some(err) = api_error(&json) {
            return Err(err);
        }

        let text = json
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| {
                arr.iter()
                    .find_map(|block| block.get("text").and_then(|t| t.as_str()))
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?
            .to_string();

        let usage = json.get("usage");
        Ok(LlmResponse {
            text,
            input_tokens: usage
                .and_then(|u| u.get("input_tokens"))
                .and_then(|t| t.as_u64()),
            output_tokens: usage
                .and_then(|u| u.get("output_tokens"))
                .and_then(|t| t.as_u64()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_mtok_input(&self) -> f64 {
        if self.model.contains("haiku") {
            0.80
        } else if self.model.contains("sonnet") {
            3.00
        } else {
            1.00
        }
    }

    fn cost_per_mtok_output(&self) -> f64 {
        if self.model.contains("haiku") {
            4.00
        } else if self.model.contains("sonnet") {
            15.00
        } else {
            5.00
        }
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible Chat Completions API (OpenAI, DeepSeek, local proxies)
// ---------------------------------------------------------------------------

/// OpenAI-compatible provider.
#[cfg(feature = "openai")]
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    settings: RequestSettings,
    agent: ureq::Agent,
}

#[cfg(feature = "openai")]
impl OpenAiProvider {
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
    const DEFAULT_BASE_URL: &str = "https://api.openai.com";
    pub const DEEPSEEK_MODEL: &str = "deepseek-chat";
    const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";

    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        settings: RequestSettings,
    ) -> Self {
        Self {
            api_key,
            model: model.unwrap_or_else(|| Self::DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            settings,
            agent: build_agent(settings.timeout),
        }
    }

    /// DeepSeek speaks the same protocol under its own endpoint and model names.
    pub fn deepseek(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        settings: RequestSettings,
    ) -> Self {
        Self::new(
            api_key,
            Some(model.unwrap_or_else(|| Self::DEEPSEEK_MODEL.to_string())),
            Some(base_url.unwrap_or_else(|| Self::DEEPSEEK_BASE_URL.to_string())),
            settings,
        )
    }
}

#[cfg(feature = "openai")]
impl LlmProvider for OpenAiProvider {
    fn complete(&self, system: &str, user: &str) -> Result<LlmResponse, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ]
        });

        let mut response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .send_json(&body)
            .map_err(map_send_error)?;

        let json: Value = response
            .body_mut()
            .read_json()
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if let Some(err) = api_error(&json) {
            return Err(err);
        }

        let text = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|c| c.as_str())
            .filter(|t| !t.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)?
            .to_string();

        let usage = json.get("usage");
        Ok(LlmResponse {
            text,
            input_tokens: usage
                .and_then(|u| u.get("prompt_tokens"))
                .and_then(|t| t.as_u64()),
            output_tokens: usage
                .and_then(|u| u.get("completion_tokens"))
                .and_then(|t| t.as_u64()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_mtok_input(&self) -> f64 {
        if self.model.starts_with("deepseek") {
            0.27
        } else if self.model.contains("4o-mini") {
            0.15
        } else if self.model.contains("4o") {
            2.50
        } else {
            0.50
        }
    }

    fn cost_per_mtok_output(&self) -> f64 {
        if self.model.starts_with("deepseek") {
            1.10
        } else if self.model.contains("4o-mini") {
            0.60
        } else if self.model.contains("4o") {
            10.00
        } else {
            1.50
        }
    }
}

/// Create a provider by name.
pub fn create_provider(
    provider_name: &str,
    api_key: &str,
    model: Option<&str>,
    base_url: Option<&str>,
    settings: RequestSettings,
) -> Result<Box<dyn LlmProvider>, ProviderError> {
    match provider_name {
        #[cfg(feature = "openai")]
        "deepseek" => Ok(Box::new(OpenAiProvider::deepseek(
            api_key.to_string(),
            model.map(String::from),
            base_url.map(String::from),
            settings,
        ))),
        #[cfg(feature = "openai")]
        "openai" => Ok(Box::new(OpenAiProvider::new(
            api_key.to_string(),
            model.map(String::from),
            base_url.map(String::from),
            settings,
        ))),
        #[cfg(feature = "anthropic")]
        "anthropic" => Ok(Box::new(AnthropicProvider::new(
            api_key.to_string(),
            model.map(String::from),
            settings,
        ))),
        other => Err(ProviderError::UnknownProvider {
            name: other.to_string(),
            available: available_providers().join(", "),
        }),
    }
}

/// List compiled-in provider names.
pub fn available_providers() -> Vec<&'static str> {
    vec![
        #[cfg(feature = "openai")]
        "deepseek",
        #[cfg(feature = "openai")]
        "openai",
        #[cfg(feature = "anthropic")]
        "anthropic",
    ]
}

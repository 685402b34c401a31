use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use salesdesk_core::config::{GeminiConfig, OpenAiConfig};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;

const USER_AGENT: &str = concat!("salesdesk/", env!("CARGO_PKG_VERSION"));

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} API key is not configured")]
    MissingCredentials { provider: &'static str },
    #[error("{provider} request failed: {message}")]
    Transport { provider: &'static str, message: String },
    #[error("{provider} returned {status}: {body}")]
    Status { provider: &'static str, status: u16, body: String },
    #[error("{provider} response was malformed: {detail}")]
    MalformedResponse { provider: &'static str, detail: String },
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub const PROVIDER: &'static str = "OpenAI";

    pub fn from_config(config: &OpenAiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(Self::PROVIDER, config.timeout_secs)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        Self::PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let secret = usable_secret(self.api_key.as_ref())
            .ok_or(ProviderError::MissingCredentials { provider: Self::PROVIDER })?;
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .bearer_auth(secret)
            .json(&openai_payload(&self.model, prompt, self.max_tokens))
            .send()
            .await
            .map_err(|error| transport(Self::PROVIDER, error))?;

        let body = read_json(Self::PROVIDER, response).await?;
        extract_openai_text(&body)
    }
}

#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub const PROVIDER: &'static str = "Gemini";

    pub fn from_config(config: &GeminiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(Self::PROVIDER, config.timeout_secs)?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &'static str {
        Self::PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let secret = usable_secret(self.api_key.as_ref())
            .ok_or(ProviderError::MissingCredentials { provider: Self::PROVIDER })?;
        let model = self.model.trim_start_matches("models/");
        let url =
            format!("{}/models/{model}:generateContent", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", secret)
            .json(&gemini_payload(prompt))
            .send()
            .await
            .map_err(|error| transport(Self::PROVIDER, error))?;

        let body = read_json(Self::PROVIDER, response).await?;
        extract_gemini_text(&body)
    }
}

fn http_client(provider: &'static str, timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|error| transport(provider, error))
}

fn usable_secret(secret: Option<&SecretString>) -> Option<&str> {
    secret.map(|value| value.expose_secret().trim()).filter(|value| !value.is_empty())
}

fn transport(provider: &'static str, error: reqwest::Error) -> ProviderError {
    ProviderError::Transport { provider, message: error.to_string() }
}

async fn read_json(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status { provider, status: status.as_u16(), body });
    }

    response
        .json::<Value>()
        .await
        .map_err(|error| ProviderError::MalformedResponse { provider, detail: error.to_string() })
}

pub fn openai_payload(model: &str, prompt: &str, max_tokens: u32) -> Value {
    json!({
        "model": model,
        "messages": [
            {"role": "user", "content": prompt}
        ],
        "max_tokens": max_tokens,
    })
}

pub fn gemini_payload(prompt: &str) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [{"text": prompt}]
            }
        ]
    })
}

pub fn extract_openai_text(body: &Value) -> Result<String, ProviderError> {
    body.get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(ToString::to_string)
        .ok_or_else(|| ProviderError::MalformedResponse {
            provider: OpenAiClient::PROVIDER,
            detail: "missing choices[0].message.content".to_string(),
        })
}

/// Joins the text of every part in the first candidate; answers may arrive
/// split across several parts.
pub fn extract_gemini_text(body: &Value) -> Result<String, ProviderError> {
    let texts: Vec<&str> = body
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .map(|parts| parts.iter().filter_map(|part| part.get("text")?.as_str()).collect())
        .unwrap_or_default();

    if texts.is_empty() {
        return Err(ProviderError::MalformedResponse {
            provider: GeminiClient::PROVIDER,
            detail: "missing candidates[0].content.parts[*].text".to_string(),
        });
    }
    Ok(texts.concat())
}

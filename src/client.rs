//! Chat-completion client for OpenAI-compatible APIs (Groq, OpenAI, local servers).

use crate::{
    config::{Config, Endpoint, Provider},
    error::{Error, Result},
    preset::LlmPreset,
};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions for the model
    System,
    /// The user's prompt
    User,
    /// A previous model answer
    Assistant,
}

/// One message of a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Message author
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single chat-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model id
    pub model: String,
    /// Conversation sent to the model
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature, `None` for the provider default
    pub temperature: Option<f32>,
    /// Completion token limit, `None` for the provider default
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Creates a request with a single user message.
    #[must_use]
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
            max_tokens: None,
        }
    }

    /// Builds a request for `prompt` using a task preset.
    ///
    /// The preset's model is replaced by the configured override, if any.
    #[must_use]
    pub fn from_preset(preset: &LlmPreset, config: &Config, prompt: impl Into<String>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = preset.system_prompt {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(prompt));

        Self {
            model: config.model_or(preset.model).to_string(),
            messages,
            temperature: preset.temperature,
            max_tokens: preset.max_tokens,
        }
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the completion token limit.
    #[must_use]
    pub const fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

/// Anything that can turn a prompt into completion text.
///
/// Implementations must be thread-safe. Failures are returned, never retried.
pub trait CompletionProvider: Send + Sync {
    /// Sends a request and returns the trimmed completion text.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached, rejects the
    /// request, or answers without text.
    fn send(&self, request: &CompletionRequest) -> Result<String>;

    /// Completes a single user prompt.
    ///
    /// # Errors
    ///
    /// Same as [`CompletionProvider::send`].
    fn complete(
        &self,
        prompt: &str,
        model_id: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = CompletionRequest::new(model_id, prompt)
            .temperature(temperature)
            .max_tokens(max_tokens);
        self.send(&request)
    }
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for &P {
    fn send(&self, request: &CompletionRequest) -> Result<String> {
        (**self).send(request)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

impl<'a> From<&'a CompletionRequest> for ChatRequestBody<'a> {
    fn from(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_completion_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Blocking HTTP client for the `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    url: String,
    provider: Provider,
}

impl ChatClient {
    /// Creates a client for the provider a task prefers.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config, default_provider: Provider) -> Result<Self> {
        let endpoint = config.endpoint(default_provider)?;
        Self::with_endpoint(&endpoint, Duration::from_secs(config.timeout_secs))
    }

    /// Creates a client for an already resolved endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn with_endpoint(endpoint: &Endpoint, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", endpoint.api_key))
            .map_err(|e| Error::config(format!("Invalid API key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        info!(
            "Using {:?} completion endpoint at {}",
            endpoint.provider, endpoint.base_url
        );

        Ok(Self {
            client,
            url: completions_url(&endpoint.base_url),
            provider: endpoint.provider,
        })
    }

    /// Returns the provider this client talks to.
    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }
}

impl CompletionProvider for ChatClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    fn send(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequestBody::from(request);

        debug!(
            "Sending {} message(s) to {}",
            request.messages.len(),
            self.url
        );

        let response = self.client.post(&self.url).json(&body).send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &text));
        }

        parse_completion(&text, &request.model)
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// Extracts the first choice's text from a response body.
fn parse_completion(body: &str, model: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or_else(|| Error::EmptyResponse {
            model: model.to_string(),
        })?;

    debug!("Received {} chars of completion text", content.len());
    Ok(content)
}

/// Builds an error from a non-success response, preferring the provider's message.
fn api_error(status: u16, body: &str) -> Error {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    Error::api(status, message)
}

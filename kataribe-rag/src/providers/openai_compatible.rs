//! OpenAI-compatible chat completions client.

use std::time::Duration;

use kataribe_core::LlmSettings;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{RagError, RagResult};
use crate::models::{GenerationResult, GenerationSettings, GenerationUsage, Prompt};
use crate::providers::provider::Generator;

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAiCompatibleClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    provider_name: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

/// `{"error": {"message", "type", "code"}}` as returned on non-2xx.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<Value>,
}

impl OpenAiCompatibleClient {
    /// Create a new OpenAI-compatible client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        provider_name: impl Into<String>,
        timeout: Duration,
    ) -> RagResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Generation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            provider_name: provider_name.into(),
            temperature: 1.0,
            max_tokens: None,
        })
    }

    /// Build from the `[generation]` settings. `model` is the resolved default model.
    pub fn from_settings(
        settings: &LlmSettings,
        api_key: Option<String>,
        model: &str,
    ) -> RagResult<Self> {
        Ok(Self::new(
            &settings.base_url,
            api_key,
            model,
            "OpenAI",
            Duration::from_secs(settings.request_timeout_seconds),
        )?
        .with_temperature(settings.temperature)
        .with_max_tokens(settings.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key
            && let Ok(header_value) = HeaderValue::from_str(&format!("Bearer {}", api_key))
        {
            headers.insert(AUTHORIZATION, header_value);
        }
        headers
    }

    fn chat_completions_url(&self) -> String {
        api_url(&self.base_url, "chat/completions")
    }

    fn build_request<'a>(
        &'a self,
        prompt: &'a Prompt,
        settings: Option<&'a GenerationSettings>,
    ) -> ChatCompletionsRequest<'a> {
        let model = settings
            .and_then(|s| s.model.as_deref())
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.model);
        ChatCompletionsRequest {
            model,
            messages: vec![
                OpenAiMessage {
                    role: "system",
                    content: &prompt.system_instructions,
                },
                OpenAiMessage {
                    role: "user",
                    content: &prompt.user_query,
                },
            ],
            temperature: settings
                .and_then(|s| s.temperature)
                .unwrap_or(self.temperature),
            max_tokens: settings.and_then(|s| s.max_tokens).or(self.max_tokens),
            stream: false,
        }
    }

    fn failure(&self, reason: impl std::fmt::Display) -> RagError {
        RagError::Generation(format!(
            "Failed to generate AI response via {}: {}",
            self.provider_name, reason
        ))
    }

    fn convert_response(
        &self,
        response: ChatCompletionsResponse,
        requested: &str,
    ) -> GenerationResult {
        GenerationResult {
            text: response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content),
            usage: response.usage.map(|u| GenerationUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: if u.total_tokens == 0 {
                    u.prompt_tokens + u.completion_tokens
                } else {
                    u.total_tokens
                },
            }),
            model: response.model.unwrap_or_else(|| requested.to_string()),
        }
    }
}

/// `<base>/v1/<path>`, adding `/v1` only when the base does not already end with it.
pub(crate) fn api_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/{}", base, path)
    } else {
        format!("{}/v1/{}", base, path)
    }
}

/// Short, human-readable description of a transport failure.
fn describe_transport_error(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "request timed out"
    } else if error.is_connect() {
        "could not connect to the generation backend"
    } else if error.is_decode() {
        "malformed response"
    } else {
        "request failed"
    }
}

#[async_trait::async_trait]
impl Generator for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &Prompt,
        settings: Option<&GenerationSettings>,
    ) -> RagResult<GenerationResult> {
        let request_body = self.build_request(prompt, settings);

        let response = self
            .http_client
            .post(self.chat_completions_url())
            .headers(self.build_headers())
            .json(&request_body)
            .send()
            .await
            .map_err(|error| {
                tracing::error!(
                    provider = %self.provider_name,
                    %error,
                    "generation request failed"
                );
                self.failure(describe_transport_error(&error))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error)
                .unwrap_or_default();
            tracing::error!(
                provider = %self.provider_name,
                status = status.as_u16(),
                code = ?detail.code,
                kind = ?detail.kind,
                "generation API error"
            );
            let reason = match detail.message {
                Some(message) => format!("{status}: {message}"),
                None => status.to_string(),
            };
            return Err(self.failure(reason));
        }

        let completions: ChatCompletionsResponse = response.json().await.map_err(|error| {
            tracing::error!(
                provider = %self.provider_name,
                %error,
                "unparseable generation response"
            );
            self.failure("malformed response")
        })?;

        let result = self.convert_response(completions, request_body.model);
        if let Some(usage) = &result.usage {
            tracing::debug!(
                model = %result.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "generation complete"
            );
        }
        Ok(result)
    }
}

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

use super::gateway::{
    ChatGateway, ChatGatewayError, ChatGatewayFuture, ChatGatewayRequest, ChatGatewayResponse,
    ChatTokenUsage,
};
use crate::config::{ChatProvider, ConfigError};
use crate::config_env::{optional_trimmed_lookup, parse_u32_lookup, parse_u64_lookup, process_env};

const DEFAULT_CHAT_COMPLETIONS_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const GEMINI_CHAT_COMPLETIONS_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BASE_BACKOFF_MS: u64 = 250;
const DEFAULT_TEMPERATURE: f32 = 0.7;

const DEFAULT_PRIMARY_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_FALLBACK_MODEL: &str = "openai/gpt-4o-mini";
const GEMINI_PRIMARY_MODEL: &str = "gemini-2.5-flash";

/// Endpoint and model defaults for a provider; `AVA_CHAT_*` variables
/// override each of them.
struct ProviderDefaults {
    chat_completions_url: &'static str,
    primary_model: &'static str,
    fallback_model: Option<&'static str>,
}

const fn provider_defaults(provider: ChatProvider) -> ProviderDefaults {
    match provider {
        ChatProvider::OpenRouter => ProviderDefaults {
            chat_completions_url: DEFAULT_CHAT_COMPLETIONS_URL,
            primary_model: DEFAULT_PRIMARY_MODEL,
            fallback_model: Some(DEFAULT_FALLBACK_MODEL),
        },
        ChatProvider::Gemini => ProviderDefaults {
            chat_completions_url: GEMINI_CHAT_COMPLETIONS_URL,
            primary_model: GEMINI_PRIMARY_MODEL,
            fallback_model: None,
        },
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouterModelRoute {
    pub primary_model: String,
    pub fallback_model: Option<String>,
}

impl OpenRouterModelRoute {
    fn candidate_models(&self) -> Vec<&str> {
        let mut candidates = Vec::new();
        if !self.primary_model.is_empty() {
            candidates.push(self.primary_model.as_str());
        }

        if let Some(fallback_model) = self.fallback_model.as_deref()
            && !fallback_model.is_empty()
            && fallback_model != self.primary_model
        {
            candidates.push(fallback_model);
        }

        candidates
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouterGatewayConfig {
    pub chat_completions_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_backoff_ms: u64,
    pub temperature: f32,
    pub model_route: OpenRouterModelRoute,
}

impl OpenRouterGatewayConfig {
    /// Builds the gateway config from `AVA_CHAT_*` variables. The API key
    /// and its provider come from the already-loaded assistant configuration.
    pub fn from_env(
        api_key: &str,
        provider: ChatProvider,
    ) -> Result<Self, OpenRouterConfigError> {
        Self::from_lookup(api_key, provider, process_env)
    }

    pub fn from_lookup<F>(
        api_key: &str,
        provider: ChatProvider,
        lookup: F,
    ) -> Result<Self, OpenRouterConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(OpenRouterConfigError::MissingApiKey);
        }

        let defaults = provider_defaults(provider);
        let chat_completions_url = optional_trimmed_lookup(&lookup, "AVA_CHAT_COMPLETIONS_URL")
            .unwrap_or_else(|| defaults.chat_completions_url.to_string());
        if !chat_completions_url.starts_with("http://")
            && !chat_completions_url.starts_with("https://")
        {
            return Err(OpenRouterConfigError::InvalidConfiguration(
                "AVA_CHAT_COMPLETIONS_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            chat_completions_url,
            api_key: api_key.to_string(),
            timeout_ms: parse_u64_lookup(&lookup, "AVA_CHAT_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_retries: parse_u32_lookup(&lookup, "AVA_CHAT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_backoff_ms: parse_u64_lookup(
                &lookup,
                "AVA_CHAT_RETRY_BASE_BACKOFF_MS",
                DEFAULT_RETRY_BASE_BACKOFF_MS,
            )?,
            temperature: DEFAULT_TEMPERATURE,
            model_route: OpenRouterModelRoute {
                primary_model: optional_trimmed_lookup(&lookup, "AVA_CHAT_MODEL_PRIMARY")
                    .unwrap_or_else(|| defaults.primary_model.to_string()),
                fallback_model: optional_trimmed_lookup(&lookup, "AVA_CHAT_MODEL_FALLBACK")
                    .or_else(|| defaults.fallback_model.map(ToString::to_string)),
            },
        })
    }
}

#[derive(Debug, Error)]
pub enum OpenRouterConfigError {
    #[error("conversational api key is missing")]
    MissingApiKey,
    #[error(transparent)]
    Env(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build OpenRouter http client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct OpenRouterGateway {
    client: reqwest::Client,
    config: OpenRouterGatewayConfig,
}

impl OpenRouterGateway {
    pub fn new(config: OpenRouterGatewayConfig) -> Result<Self, OpenRouterConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| OpenRouterConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn generate_for_model(
        &self,
        model: &str,
        request: &ChatGatewayRequest,
    ) -> Result<ChatGatewayResponse, ModelAttemptError> {
        let mut attempt = 0_u32;

        loop {
            match self.send_once(model, request).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if err.retryable && attempt < self.config.max_retries {
                        let backoff_multiplier = 2_u64.saturating_pow(attempt);
                        let backoff_ms = self
                            .config
                            .retry_base_backoff_ms
                            .saturating_mul(backoff_multiplier);
                        debug!(model, attempt, backoff_ms, "retrying chat provider request");
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }

                    return Err(ModelAttemptError {
                        error: err.error,
                        fallback_allowed: err.fallback_allowed,
                    });
                }
            }
        }
    }

    async fn send_once(
        &self,
        model: &str,
        request: &ChatGatewayRequest,
    ) -> Result<ChatGatewayResponse, SendAttemptError> {
        let request_body = json!({
            "model": model,
            "messages": chat_messages(request),
            "temperature": self.config.temperature
        });

        let response = self
            .client
            .post(&self.config.chat_completions_url)
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SendAttemptError::retryable(ChatGatewayError::Timeout, true)
                } else {
                    SendAttemptError::retryable(
                        ChatGatewayError::ProviderFailure("request_unavailable".to_string()),
                        true,
                    )
                }
            })?;

        let status = response.status();
        let header_request_id = header_request_id(response.headers());
        let body = response.text().await.map_err(|_| {
            SendAttemptError::non_retryable(
                ChatGatewayError::InvalidProviderPayload("response_body_read_failed".to_string()),
                true,
            )
        })?;

        if !status.is_success() {
            let provider_code = parse_provider_error_code(&body);
            let is_retryable = is_retryable_status(status);
            let fallback_allowed =
                status != StatusCode::UNAUTHORIZED && status != StatusCode::FORBIDDEN;
            return Err(SendAttemptError {
                error: ChatGatewayError::ProviderFailure(format!(
                    "status={} code={provider_code}",
                    status.as_u16()
                )),
                retryable: is_retryable,
                fallback_allowed,
            });
        }

        let parsed: OpenRouterSuccessResponse = serde_json::from_str(&body).map_err(|_| {
            SendAttemptError::non_retryable(
                ChatGatewayError::InvalidProviderPayload("response_json_parse_failed".to_string()),
                true,
            )
        })?;

        let content = parsed
            .choices
            .first()
            .ok_or_else(|| {
                SendAttemptError::non_retryable(
                    ChatGatewayError::InvalidProviderPayload("missing_choice".to_string()),
                    true,
                )
            })?
            .message
            .content
            .clone();

        let text = content_text(content).ok_or_else(|| {
            SendAttemptError::non_retryable(
                ChatGatewayError::InvalidProviderPayload("unsupported_content_shape".to_string()),
                true,
            )
        })?;

        Ok(ChatGatewayResponse {
            model: parsed.model.unwrap_or_else(|| model.to_string()),
            provider_request_id: header_request_id.or(parsed.id),
            text,
            usage: parsed.usage.map(|usage| ChatTokenUsage {
                prompt_tokens: clamp_u64_to_u32(usage.prompt_tokens.unwrap_or(0)),
                completion_tokens: clamp_u64_to_u32(usage.completion_tokens.unwrap_or(0)),
                total_tokens: clamp_u64_to_u32(usage.total_tokens.unwrap_or(0)),
            }),
        })
    }
}

impl ChatGateway for OpenRouterGateway {
    fn generate<'a>(&'a self, request: ChatGatewayRequest) -> ChatGatewayFuture<'a> {
        Box::pin(async move {
            let candidate_models = self.config.model_route.candidate_models();

            for (index, model) in candidate_models.iter().enumerate() {
                match self.generate_for_model(model, &request).await {
                    Ok(response) => return Ok(response),
                    Err(model_err) => {
                        let has_more_candidates = index + 1 < candidate_models.len();
                        if has_more_candidates && model_err.fallback_allowed {
                            continue;
                        }
                        return Err(model_err.error);
                    }
                }
            }

            Err(ChatGatewayError::ProviderFailure(
                "no_openrouter_model_candidates".to_string(),
            ))
        })
    }
}

#[derive(Debug)]
struct SendAttemptError {
    error: ChatGatewayError,
    retryable: bool,
    fallback_allowed: bool,
}

impl SendAttemptError {
    fn retryable(error: ChatGatewayError, fallback_allowed: bool) -> Self {
        Self {
            error,
            retryable: true,
            fallback_allowed,
        }
    }

    fn non_retryable(error: ChatGatewayError, fallback_allowed: bool) -> Self {
        Self {
            error,
            retryable: false,
            fallback_allowed,
        }
    }
}

#[derive(Debug)]
struct ModelAttemptError {
    error: ChatGatewayError,
    fallback_allowed: bool,
}

#[derive(Debug, Deserialize)]
struct OpenRouterSuccessResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<OpenRouterChoice>,
    usage: Option<OpenRouterUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterMessage,
}

#[derive(Debug, Deserialize)]
struct OpenRouterMessage {
    #[serde(default)]
    content: Value,
}

#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

fn chat_messages(request: &ChatGatewayRequest) -> Vec<Value> {
    let mut messages = Vec::with_capacity(request.history.len() * 2 + 2);
    if !request.system_prompt.trim().is_empty() {
        messages.push(json!({ "role": "system", "content": request.system_prompt }));
    }
    for turn in &request.history {
        messages.push(json!({ "role": "user", "content": turn.prompt }));
        messages.push(json!({ "role": "assistant", "content": turn.response }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));
    messages
}

/// Accepts either a plain string or an array of `{ "type": "text", "text": .. }` parts.
fn content_text(content: Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text),
        Value::Array(parts) => {
            let text = parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("");
            Some(text)
        }
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn header_request_id(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

fn parse_provider_error_code(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        code: Option<Value>,
    }

    let parsed = serde_json::from_str::<ProviderErrorEnvelope>(body).ok();
    let Some(provider_error_code) = parsed
        .and_then(|envelope| envelope.error)
        .and_then(|details| details.code)
    else {
        return "unknown".to_string();
    };

    match provider_error_code {
        Value::String(code) => code,
        Value::Number(code) => code.to_string(),
        _ => "unknown".to_string(),
    }
}

fn clamp_u64_to_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ChatGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ChatGatewayResponse, ChatGatewayError>> + Send + 'a>>;

pub const DEFAULT_SESSION_MAX_TURNS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub prompt: String,
    pub response: String,
}

#[derive(Debug, Clone)]
pub struct ChatGatewayRequest {
    pub system_prompt: String,
    pub history: Vec<ChatTurn>,
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatTokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatGatewayResponse {
    pub model: String,
    pub provider_request_id: Option<String>,
    pub text: String,
    pub usage: Option<ChatTokenUsage>,
}

#[derive(Debug, Error)]
pub enum ChatGatewayError {
    #[error("chat provider request timed out")]
    Timeout,
    #[error("chat provider request failed: {0}")]
    ProviderFailure(String),
    #[error("chat provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
    #[error("chat provider is not configured")]
    NotConfigured,
}

pub trait ChatGateway: Send + Sync {
    fn generate<'a>(&'a self, request: ChatGatewayRequest) -> ChatGatewayFuture<'a>;
}

/// Conversation memory for one chat partner. The whole history is replayed
/// to the gateway on every turn; a turn is only recorded when the gateway
/// returned non-empty text.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_prompt: String,
    turns: Vec<ChatTurn>,
    max_turns: usize,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            turns: Vec::new(),
            max_turns: DEFAULT_SESSION_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn reset(&mut self) {
        self.turns.clear();
    }

    pub async fn send(
        &mut self,
        gateway: &dyn ChatGateway,
        prompt: &str,
    ) -> Result<String, ChatGatewayError> {
        let request = ChatGatewayRequest {
            system_prompt: self.system_prompt.clone(),
            history: self.turns.clone(),
            prompt: prompt.to_string(),
        };

        let response = gateway.generate(request).await?;
        let text = response.text.trim().to_string();
        if !text.is_empty() {
            self.record(prompt, &text);
        }

        Ok(text)
    }

    fn record(&mut self, prompt: &str, response: &str) {
        self.turns.push(ChatTurn {
            prompt: prompt.to_string(),
            response: response.to_string(),
        });

        if self.turns.len() > self.max_turns {
            self.turns = self.turns.split_off(self.turns.len() - self.max_turns);
        }
    }
}

/// Gateway used when no conversational API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredChatGateway;

impl ChatGateway for UnconfiguredChatGateway {
    fn generate<'a>(&'a self, _request: ChatGatewayRequest) -> ChatGatewayFuture<'a> {
        Box::pin(async { Err(ChatGatewayError::NotConfigured) })
    }
}

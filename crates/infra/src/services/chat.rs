use super::{read_json, ProviderError};
use crate::config::OpenAIConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
}

#[async_trait::async_trait]
pub trait IChatProvider: Send + Sync {
    /// Returns the text of the completion
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;
}

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIChatProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIChatProvider {
    pub fn new(client: Client, config: OpenAIConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[async_trait::async_trait]
impl IChatProvider for OpenAIChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: Some(request.system.clone()),
                },
                ChatMessage {
                    role: "user".into(),
                    content: Some(request.user.clone()),
                },
            ],
        };
        let res = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;
        let res: ChatCompletionResponse = read_json("OpenAI", res).await?;

        res.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ProviderError::MalformedResponse {
                provider: "OpenAI",
                message: "completion contained no answer".into(),
            })
    }
}

/// Answers every request with a fixed reply and remembers the requests
pub struct InMemoryChatProvider {
    reply: Result<String, String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl InMemoryChatProvider {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider rejecting every request with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl IChatProvider for InMemoryChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply.clone().map_err(|body| ProviderError::Rejected {
            provider: "OpenAI",
            status: 429,
            body,
        })
    }
}

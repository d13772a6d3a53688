use super::{read_json, ProviderError};
use crate::config::ResendConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait::async_trait]
pub trait IEmailProvider: Send + Sync {
    /// Sends the email and returns the provider id of it
    async fn send(&self, message: &EmailMessage) -> Result<String, ProviderError>;
}

const RESEND_API_URL: &str = "https://api.resend.com/emails";

pub struct ResendEmailProvider {
    client: Client,
    config: ResendConfig,
}

impl ResendEmailProvider {
    pub fn new(client: Client, config: ResendConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendEmailResponse {
    id: String,
}

#[async_trait::async_trait]
impl IEmailProvider for ResendEmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<String, ProviderError> {
        let body = ResendEmailRequest {
            from: &self.config.from_address,
            to: vec![&message.to],
            subject: &message.subject,
            html: &message.html,
        };
        let res = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await;
        let res: ResendEmailResponse = read_json("Resend", res).await?;
        Ok(res.id)
    }
}

/// Records the emails instead of sending them
#[derive(Default)]
pub struct InMemoryEmailProvider {
    sent: Mutex<Vec<EmailMessage>>,
    fail_all: Mutex<bool>,
}

impl InMemoryEmailProvider {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes every later email fail
    pub fn fail_all(&self) {
        if let Ok(mut fail) = self.fail_all.lock() {
            *fail = true;
        }
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl IEmailProvider for InMemoryEmailProvider {
    async fn send(&self, message: &EmailMessage) -> Result<String, ProviderError> {
        if self.fail_all.lock().map(|fail| *fail).unwrap_or(false) {
            return Err(ProviderError::Rejected {
                provider: "Resend",
                status: 422,
                body: "Invalid `to` field".into(),
            });
        }
        let mut sent = self.sent.lock().map_err(|_| ProviderError::Network {
            provider: "Resend",
            message: "outbox is unavailable".into(),
        })?;
        sent.push(message.clone());
        Ok(format!("email_{}", sent.len()))
    }
}

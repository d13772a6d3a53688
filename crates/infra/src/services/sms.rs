use super::{read_json, ProviderError};
use crate::config::TwilioConfig;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct SmsMessage {
    pub to: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait ISmsProvider: Send + Sync {
    /// Sends the message and returns the provider id of it
    async fn send(&self, message: &SmsMessage) -> Result<String, ProviderError>;
}

const TWILIO_API_BASE_URL: &str = "https://api.twilio.com/2010-04-01";

pub struct TwilioSmsProvider {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsProvider {
    pub fn new(client: Client, config: TwilioConfig) -> Self {
        Self { client, config }
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

#[async_trait::async_trait]
impl ISmsProvider for TwilioSmsProvider {
    async fn send(&self, message: &SmsMessage) -> Result<String, ProviderError> {
        let res = self
            .client
            .post(&format!(
                "{}/Accounts/{}/Messages.json",
                TWILIO_API_BASE_URL, self.config.account_sid
            ))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", message.to.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", message.body.as_str()),
            ])
            .send()
            .await;
        let res: TwilioMessageResponse = read_json("Twilio", res).await?;
        Ok(res.sid)
    }
}

/// Records the messages instead of sending them
#[derive(Default)]
pub struct InMemorySmsProvider {
    sent: Mutex<Vec<SmsMessage>>,
    failing_destinations: Mutex<Vec<String>>,
}

impl InMemorySmsProvider {
    pub fn new() -> Self {
        Default::default()
    }

    /// Makes every later message to `to` fail
    pub fn fail_for(&self, to: &str) {
        if let Ok(mut failing) = self.failing_destinations.lock() {
            failing.push(to.to_string());
        }
    }

    pub fn sent_messages(&self) -> Vec<SmsMessage> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ISmsProvider for InMemorySmsProvider {
    async fn send(&self, message: &SmsMessage) -> Result<String, ProviderError> {
        let fails = self
            .failing_destinations
            .lock()
            .map(|failing| failing.contains(&message.to))
            .unwrap_or(false);
        if fails {
            return Err(ProviderError::Rejected {
                provider: "Twilio",
                status: 400,
                body: format!("The 'To' number {} is not a valid phone number.", message.to),
            });
        }

        let mut sent = self.sent.lock().map_err(|_| ProviderError::Network {
            provider: "Twilio",
            message: "outbox is unavailable".into(),
        })?;
        sent.push(message.clone());
        Ok(format!("SM{}", sent.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inmemory_provider_records_and_fails() {
        let provider = InMemorySmsProvider::new();
        provider.fail_for("+447700900999");

        let ok = SmsMessage {
            to: "+447700900123".into(),
            body: "Hello".into(),
        };
        assert_eq!(provider.send(&ok).await.unwrap(), "SM1");

        let failing = SmsMessage {
            to: "+447700900999".into(),
            body: "Hello".into(),
        };
        assert!(matches!(
            provider.send(&failing).await,
            Err(ProviderError::Rejected { status: 400, .. })
        ));
        assert_eq!(provider.sent_messages(), vec![ok]);
    }
}

mod billing;
mod chat;
mod email;
mod sms;

pub use billing::*;
pub use chat::*;
pub use email::*;
pub use sms::*;

use crate::config::Config;
use reqwest::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Request to {provider} failed: {message}")]
    Network {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} rejected the request with status {status}: {body}")]
    Rejected {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} returned an unexpected response: {message}")]
    MalformedResponse {
        provider: &'static str,
        message: String,
    },
}

/// Reads the json body of a provider response, treating non 2xx statuses as rejections
async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    res: Result<Response, reqwest::Error>,
) -> Result<T, ProviderError> {
    let res = res.map_err(|e| {
        error!("[Network Error] {} API error. Error message: {:?}", provider, e);
        ProviderError::Network {
            provider,
            message: e.to_string(),
        }
    })?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        error!(
            "[Rejected] {} API responded with status: {}. Body: {}",
            provider, status, body
        );
        return Err(ProviderError::Rejected {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    res.json::<T>().await.map_err(|e| {
        error!(
            "[Unexpected Response] {} API error. Error message: {:?}",
            provider, e
        );
        ProviderError::MalformedResponse {
            provider,
            message: e.to_string(),
        }
    })
}

/// The external providers the server talks to. A provider is absent when it
/// has not been configured.
#[derive(Clone, Default)]
pub struct Services {
    pub sms: Option<Arc<dyn ISmsProvider>>,
    pub email: Option<Arc<dyn IEmailProvider>>,
    pub billing: Option<Arc<dyn IBillingProvider>>,
    pub chat: Option<Arc<dyn IChatProvider>>,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let client = reqwest::Client::new();
        Self {
            sms: config.twilio.clone().map(|twilio| {
                Arc::new(TwilioSmsProvider::new(client.clone(), twilio)) as Arc<dyn ISmsProvider>
            }),
            email: config.resend.clone().map(|resend| {
                Arc::new(ResendEmailProvider::new(client.clone(), resend)) as Arc<dyn IEmailProvider>
            }),
            billing: config.stripe.clone().map(|stripe| {
                Arc::new(StripeBillingProvider::new(client.clone(), stripe))
                    as Arc<dyn IBillingProvider>
            }),
            chat: config.openai.clone().map(|openai| {
                Arc::new(OpenAIChatProvider::new(client, openai)) as Arc<dyn IChatProvider>
            }),
        }
    }
}

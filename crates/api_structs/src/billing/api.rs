use crate::dtos::SubscriptionDTO;
use clinic_domain::Subscription;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionDTO,
}

impl SubscriptionResponse {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription: SubscriptionDTO::new(subscription),
        }
    }
}

pub mod create_checkout_session {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub price_id: String,
        #[serde(default)]
        pub success_url: Option<String>,
        #[serde(default)]
        pub cancel_url: Option<String>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub session_id: String,
        pub url: Option<String>,
    }
}

pub mod stripe_webhook {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub received: bool,
    }
}

pub mod sync_checkout_session {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub session_id: String,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod get_subscription {
    use super::*;

    pub type APIResponse = SubscriptionResponse;
}

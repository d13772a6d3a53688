use crate::{APIResponse, BaseClient};
use clinic_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct BillingClient {
    base: Arc<BaseClient>,
}

pub struct CreateCheckoutSessionInput {
    pub price_id: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

impl BillingClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create_checkout_session(
        &self,
        input: CreateCheckoutSessionInput,
    ) -> APIResponse<create_checkout_session::APIResponse> {
        let body = create_checkout_session::RequestBody {
            price_id: input.price_id,
            success_url: input.success_url,
            cancel_url: input.cancel_url,
        };
        self.base
            .post(body, "billing/checkout".into(), StatusCode::OK)
            .await
    }

    /// Delivers a raw webhook payload with its `Stripe-Signature` header
    pub async fn send_webhook(
        &self,
        payload: Vec<u8>,
        signature: &str,
    ) -> APIResponse<stripe_webhook::APIResponse> {
        self.base
            .post_raw(
                payload,
                &[("stripe-signature", signature)],
                "billing/webhook".into(),
                StatusCode::OK,
            )
            .await
    }

    pub async fn sync_checkout_session(
        &self,
        session_id: String,
    ) -> APIResponse<sync_checkout_session::APIResponse> {
        let body = sync_checkout_session::RequestBody { session_id };
        self.base
            .post(body, "billing/sync".into(), StatusCode::OK)
            .await
    }

    pub async fn get_subscription(&self) -> APIResponse<get_subscription::APIResponse> {
        self.base
            .get("billing/subscription".into(), StatusCode::OK)
            .await
    }
}

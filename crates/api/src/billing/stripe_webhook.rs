use super::store_subscription;
use crate::error::ClinicError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::stripe_webhook::APIResponse;
use clinic_domain::{verify_stripe_signature, SignatureError, ID};
use clinic_infra::{
    CheckoutSession, ClinicContext, ProviderError, StripeEvent, StripeSubscription,
};
use tracing::{info, warn};

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub async fn stripe_webhook_controller(
    http_req: HttpRequest,
    body: web::Bytes,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let signature = http_req
        .headers()
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|sig| sig.to_str().ok())
        .map(String::from);

    let usecase = StripeWebhookUseCase {
        payload: body.to_vec(),
        signature,
    };

    execute(usecase, &ctx)
        .await
        .map(|_| HttpResponse::Ok().json(APIResponse { received: true }))
        .map_err(ClinicError::from)
}

/// Applies a signed billing provider event to the local subscriptions
#[derive(Debug)]
pub struct StripeWebhookUseCase {
    pub payload: Vec<u8>,
    pub signature: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    BillingNotConfigured,
    MissingSignature,
    InvalidSignature(SignatureError),
    MalformedEvent(String),
    Provider(ProviderError),
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::BillingNotConfigured => {
                Self::ServiceUnavailable("Billing is not configured".into())
            }
            UseCaseError::MissingSignature => {
                Self::BadClientData("Missing Stripe-Signature header".into())
            }
            UseCaseError::InvalidSignature(e) => {
                Self::BadClientData(format!("Invalid webhook signature: {}", e))
            }
            UseCaseError::MalformedEvent(e) => {
                Self::BadClientData(format!("Malformed webhook event: {}", e))
            }
            UseCaseError::Provider(e) => Self::BadGateway(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
const SUBSCRIPTION_EVENTS: [&str; 3] = [
    "customer.subscription.created",
    "customer.subscription.updated",
    "customer.subscription.deleted",
];

#[async_trait::async_trait(?Send)]
impl UseCase for StripeWebhookUseCase {
    type Response = ();

    type Error = UseCaseError;

    const NAME: &'static str = "StripeWebhook";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let stripe = ctx
            .config
            .stripe
            .as_ref()
            .ok_or(UseCaseError::BillingNotConfigured)?;
        let signature = self
            .signature
            .as_deref()
            .ok_or(UseCaseError::MissingSignature)?;
        let now_secs = ctx.sys.get_timestamp_millis() / 1000;
        verify_stripe_signature(&self.payload, signature, &stripe.webhook_secret, now_secs)
            .map_err(UseCaseError::InvalidSignature)?;

        let event: StripeEvent = serde_json::from_slice(&self.payload)
            .map_err(|e| UseCaseError::MalformedEvent(e.to_string()))?;

        let event_type = event.event_type.as_str();
        let (subscription, user_reference) = if event_type == CHECKOUT_COMPLETED {
            let session: CheckoutSession = parse_object(&event)?;
            let subscription_id = match &session.subscription {
                Some(subscription) => subscription.id().to_string(),
                None => {
                    info!("Checkout session {} has no subscription, ignoring", session.id);
                    return Ok(());
                }
            };
            let billing = ctx
                .services
                .billing
                .as_ref()
                .ok_or(UseCaseError::BillingNotConfigured)?;
            let subscription = billing
                .retrieve_subscription(&subscription_id)
                .await
                .map_err(UseCaseError::Provider)?;
            (subscription, session.user_reference().map(String::from))
        } else if SUBSCRIPTION_EVENTS.contains(&event_type) {
            (parse_object::<StripeSubscription>(&event)?, None)
        } else {
            info!("Ignoring billing event {} of type {}", event.id, event_type);
            return Ok(());
        };

        let user_id = match resolve_user(&subscription, user_reference, ctx).await {
            Some(user_id) => user_id,
            None => {
                warn!(
                    "Billing event {} for customer {} could not be matched to a user",
                    event.id, subscription.customer
                );
                return Ok(());
            }
        };

        store_subscription(user_id, &subscription, ctx)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        Ok(())
    }
}

fn parse_object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, UseCaseError> {
    serde_json::from_value(event.data.object.clone())
        .map_err(|e| UseCaseError::MalformedEvent(e.to_string()))
}

/// The user is found through the stored customer mapping, then through the
/// user reference of the event
async fn resolve_user(
    subscription: &StripeSubscription,
    user_reference: Option<String>,
    ctx: &ClinicContext,
) -> Option<ID> {
    if let Some(customer) = ctx
        .repos
        .billing_customers
        .find_by_customer_id(&subscription.customer)
        .await
    {
        return Some(customer.user_id);
    }
    user_reference
        .or_else(|| subscription.metadata.get("user_id").cloned())
        .and_then(|user_id| user_id.parse::<ID>().ok())
}

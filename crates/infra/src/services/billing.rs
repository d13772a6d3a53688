use super::{read_json, ProviderError};
use crate::config::StripeConfig;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeCustomer {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeList<T> {
    pub data: Vec<T>,
}

impl<T> Default for StripeList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: String,
    pub status: String,
    #[serde(default)]
    pub current_period_start: Option<i64>,
    #[serde(default)]
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
    #[serde(default)]
    pub items: StripeList<StripeSubscriptionItem>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl StripeSubscription {
    fn first_item(&self) -> Option<&StripeSubscriptionItem> {
        self.items.data.first()
    }

    /// Price id of the subscribed plan
    pub fn price_id(&self) -> Option<&str> {
        self.first_item().map(|item| item.price.id.as_str())
    }

    /// Billing period, read from the subscription or its first item
    pub fn period(&self) -> (Option<i64>, Option<i64>) {
        let item = self.first_item();
        (
            self.current_period_start
                .or_else(|| item.and_then(|i| i.current_period_start)),
            self.current_period_end
                .or_else(|| item.and_then(|i| i.current_period_end)),
        )
    }
}

/// A related object that is either referenced by id or expanded inline
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Expandable<T> {
    Id(String),
    Object(Box<T>),
}

impl<T> Expandable<T> {
    pub fn into_object(self) -> Option<T> {
        match self {
            Self::Id(_) => None,
            Self::Object(obj) => Some(*obj),
        }
    }
}

impl Expandable<StripeSubscription> {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Object(sub) => &sub.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub subscription: Option<Expandable<StripeSubscription>>,
}

impl CheckoutSession {
    /// The clinic user the session was created for
    pub fn user_reference(&self) -> Option<&str> {
        self.client_reference_id
            .as_deref()
            .or_else(|| self.metadata.get("user_id").map(|id| id.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateCheckoutSession {
    pub customer_id: String,
    pub price_id: String,
    pub user_id: String,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// A webhook event delivered by the billing provider
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[async_trait::async_trait]
pub trait IBillingProvider: Send + Sync {
    async fn create_customer(
        &self,
        email: Option<&str>,
        user_id: &str,
    ) -> Result<StripeCustomer, ProviderError>;
    async fn create_checkout_session(
        &self,
        params: &CreateCheckoutSession,
    ) -> Result<CheckoutSession, ProviderError>;
    /// Retrieves the session with its subscription expanded
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, ProviderError>;
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, ProviderError>;
}

const STRIPE_API_BASE_URL: &str = "https://api.stripe.com/v1";

pub struct StripeBillingProvider {
    client: Client,
    config: StripeConfig,
}

impl StripeBillingProvider {
    pub fn new(client: Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let res = self
            .client
            .post(&format!("{}/{}", STRIPE_API_BASE_URL, path))
            .bearer_auth(&self.config.secret_key)
            .form(form)
            .send()
            .await;
        read_json("Stripe", res).await
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let res = self
            .client
            .get(&format!("{}/{}", STRIPE_API_BASE_URL, path))
            .bearer_auth(&self.config.secret_key)
            .query(query)
            .send()
            .await;
        read_json("Stripe", res).await
    }
}

#[async_trait::async_trait]
impl IBillingProvider for StripeBillingProvider {
    async fn create_customer(
        &self,
        email: Option<&str>,
        user_id: &str,
    ) -> Result<StripeCustomer, ProviderError> {
        let mut form = vec![("metadata[user_id]", user_id)];
        if let Some(email) = email {
            form.push(("email", email));
        }
        self.post_form("customers", &form).await
    }

    async fn create_checkout_session(
        &self,
        params: &CreateCheckoutSession,
    ) -> Result<CheckoutSession, ProviderError> {
        let form = [
            ("mode", "subscription"),
            ("customer", params.customer_id.as_str()),
            ("client_reference_id", params.user_id.as_str()),
            ("metadata[user_id]", params.user_id.as_str()),
            ("subscription_data[metadata][user_id]", params.user_id.as_str()),
            ("line_items[0][price]", params.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", params.success_url.as_str()),
            ("cancel_url", params.cancel_url.as_str()),
        ];
        self.post_form("checkout/sessions", &form).await
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, ProviderError> {
        self.get(
            &format!("checkout/sessions/{}", session_id),
            &[("expand[]", "subscription")],
        )
        .await
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, ProviderError> {
        self.get(&format!("subscriptions/{}", subscription_id), &[])
            .await
    }
}

#[derive(Default)]
struct InMemoryBillingState {
    customers: Vec<StripeCustomer>,
    sessions: Vec<CheckoutSession>,
    subscriptions: Vec<StripeSubscription>,
    checkout_requests: Vec<CreateCheckoutSession>,
}

/// Billing provider keeping customers, sessions and subscriptions in memory
#[derive(Default)]
pub struct InMemoryBillingProvider {
    state: Mutex<InMemoryBillingState>,
}

fn not_found(object: &str, id: &str) -> ProviderError {
    ProviderError::Rejected {
        provider: "Stripe",
        status: 404,
        body: format!("No such {}: '{}'", object, id),
    }
}

fn unavailable() -> ProviderError {
    ProviderError::Network {
        provider: "Stripe",
        message: "state is unavailable".into(),
    }
}

impl InMemoryBillingProvider {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert_subscription(&self, subscription: StripeSubscription) {
        if let Ok(mut state) = self.state.lock() {
            state.subscriptions.retain(|s| s.id != subscription.id);
            state.subscriptions.push(subscription);
        }
    }

    /// Completes the checkout session by attaching the subscription to it
    pub fn complete_session(&self, session_id: &str, subscription_id: &str) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(session) = state.sessions.iter_mut().find(|s| s.id == session_id) {
                session.subscription = Some(Expandable::Id(subscription_id.to_string()));
            }
        }
    }

    pub fn customers(&self) -> Vec<StripeCustomer> {
        self.state
            .lock()
            .map(|state| state.customers.clone())
            .unwrap_or_default()
    }

    pub fn checkout_requests(&self) -> Vec<CreateCheckoutSession> {
        self.state
            .lock()
            .map(|state| state.checkout_requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl IBillingProvider for InMemoryBillingProvider {
    async fn create_customer(
        &self,
        email: Option<&str>,
        _user_id: &str,
    ) -> Result<StripeCustomer, ProviderError> {
        let mut state = self.state.lock().map_err(|_| unavailable())?;
        let customer = StripeCustomer {
            id: format!("cus_{}", state.customers.len() + 1),
            email: email.map(String::from),
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn create_checkout_session(
        &self,
        params: &CreateCheckoutSession,
    ) -> Result<CheckoutSession, ProviderError> {
        let mut state = self.state.lock().map_err(|_| unavailable())?;
        let id = format!("cs_test_{}", state.sessions.len() + 1);
        let mut metadata = HashMap::new();
        metadata.insert("user_id".to_string(), params.user_id.clone());
        let session = CheckoutSession {
            url: Some(format!("https://checkout.stripe.com/c/pay/{}", id)),
            id,
            customer: Some(params.customer_id.clone()),
            client_reference_id: Some(params.user_id.clone()),
            metadata,
            subscription: None,
        };
        state.sessions.push(session.clone());
        state.checkout_requests.push(params.clone());
        Ok(session)
    }

    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, ProviderError> {
        let state = self.state.lock().map_err(|_| unavailable())?;
        let mut session = state
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
            .ok_or_else(|| not_found("checkout.session", session_id))?;
        if let Some(Expandable::Id(sub_id)) = &session.subscription {
            if let Some(sub) = state.subscriptions.iter().find(|s| &s.id == sub_id) {
                session.subscription = Some(Expandable::Object(Box::new(sub.clone())));
            }
        }
        Ok(session)
    }

    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, ProviderError> {
        let state = self.state.lock().map_err(|_| unavailable())?;
        state
            .subscriptions
            .iter()
            .find(|s| s.id == subscription_id)
            .cloned()
            .ok_or_else(|| not_found("subscription", subscription_id))
    }
}

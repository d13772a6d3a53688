use crate::shared::entity::ID;

/// Maps a clinic user to the customer record at the billing provider.
/// Created the first time the user starts a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingCustomer {
    pub user_id: ID,
    pub stripe_customer_id: String,
    pub created: i64,
}

/// Local copy of the billing provider subscription of a clinic user,
/// keyed by the provider customer id.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub user_id: ID,
    pub stripe_customer_id: String,
    pub stripe_subscription_id: Option<String>,
    /// Provider status, e.g. `active`, `trialing`, `past_due` or `canceled`
    pub status: String,
    /// Price identifier of the subscribed plan
    pub plan: Option<String>,
    pub current_period_start: Option<i64>,
    pub current_period_end: Option<i64>,
    pub cancel_at_period_end: bool,
    pub updated: i64,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        matches!(self.status.as_str(), "active" | "trialing")
    }
}

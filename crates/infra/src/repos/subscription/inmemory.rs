use super::ISubscriptionRepo;
use crate::repos::shared::inmemory_repo::*;
use clinic_domain::{Subscription, ID};

pub struct InMemorySubscriptionRepo {
    subscriptions: std::sync::Mutex<Vec<Subscription>>,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self {
            subscriptions: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ISubscriptionRepo for InMemorySubscriptionRepo {
    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        upsert_by(subscription, &self.subscriptions, |s| {
            s.stripe_customer_id == subscription.stripe_customer_id
        });
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Option<Subscription> {
        find_by(&self.subscriptions, |s| &s.user_id == user_id)
            .into_iter()
            .max_by_key(|s| s.updated)
    }

    async fn find_by_customer(&self, stripe_customer_id: &str) -> Option<Subscription> {
        find_by(&self.subscriptions, |s| s.stripe_customer_id == stripe_customer_id)
            .into_iter()
            .next()
    }
}

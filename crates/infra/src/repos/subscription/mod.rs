mod inmemory;
mod postgres;

pub use inmemory::InMemorySubscriptionRepo;
pub use postgres::PostgresSubscriptionRepo;

use clinic_domain::{Subscription, ID};

#[async_trait::async_trait]
pub trait ISubscriptionRepo: Send + Sync {
    /// Inserts or replaces the subscription of the billing provider customer
    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> Option<Subscription>;
    async fn find_by_customer(&self, stripe_customer_id: &str) -> Option<Subscription>;
}

#[cfg(test)]
mod tests {
    use crate::ClinicContext;
    use clinic_domain::{Subscription, ID};

    fn subscription(user_id: ID, status: &str) -> Subscription {
        Subscription {
            user_id,
            stripe_customer_id: "cus_1".into(),
            stripe_subscription_id: Some("sub_1".into()),
            status: status.into(),
            plan: Some("price_pro".into()),
            current_period_start: Some(1_700_000_000),
            current_period_end: Some(1_702_592_000),
            cancel_at_period_end: false,
            updated: 0,
        }
    }

    #[tokio::test]
    async fn upsert_is_keyed_by_customer() {
        let ctx = ClinicContext::create_inmemory();
        let user_id = ID::new();
        let repo = &ctx.repos.subscriptions;

        repo.upsert(&subscription(user_id.clone(), "incomplete"))
            .await
            .unwrap();
        repo.upsert(&subscription(user_id.clone(), "active"))
            .await
            .unwrap();

        let res = repo.find_by_user(&user_id).await.unwrap();
        assert_eq!(res.status, "active");
        assert_eq!(repo.find_by_customer("cus_1").await, Some(res));
        assert!(repo.find_by_user(&ID::new()).await.is_none());
    }
}

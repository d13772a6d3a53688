mod inmemory;
mod postgres;

pub use inmemory::InMemoryBillingCustomerRepo;
pub use postgres::PostgresBillingCustomerRepo;

use clinic_domain::{BillingCustomer, ID};

#[async_trait::async_trait]
pub trait IBillingCustomerRepo: Send + Sync {
    async fn insert(&self, customer: &BillingCustomer) -> anyhow::Result<()>;
    async fn find_by_user(&self, user_id: &ID) -> Option<BillingCustomer>;
    async fn find_by_customer_id(&self, stripe_customer_id: &str) -> Option<BillingCustomer>;
}

#[cfg(test)]
mod tests {
    use crate::ClinicContext;
    use clinic_domain::{BillingCustomer, ID};

    #[tokio::test]
    async fn finds_customer_by_user_and_provider_id() {
        let ctx = ClinicContext::create_inmemory();
        let customer = BillingCustomer {
            user_id: ID::new(),
            stripe_customer_id: "cus_123".into(),
            created: 0,
        };
        ctx.repos.billing_customers.insert(&customer).await.unwrap();

        assert_eq!(
            ctx.repos.billing_customers.find_by_user(&customer.user_id).await,
            Some(customer.clone())
        );
        assert_eq!(
            ctx.repos.billing_customers.find_by_customer_id("cus_123").await,
            Some(customer)
        );
        assert!(ctx
            .repos
            .billing_customers
            .find_by_customer_id("cus_other")
            .await
            .is_none());
    }
}

use super::IBillingCustomerRepo;
use crate::repos::shared::inmemory_repo::*;
use clinic_domain::{BillingCustomer, ID};

pub struct InMemoryBillingCustomerRepo {
    customers: std::sync::Mutex<Vec<BillingCustomer>>,
}

impl InMemoryBillingCustomerRepo {
    pub fn new() -> Self {
        Self {
            customers: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IBillingCustomerRepo for InMemoryBillingCustomerRepo {
    async fn insert(&self, customer: &BillingCustomer) -> anyhow::Result<()> {
        insert(customer, &self.customers);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Option<BillingCustomer> {
        find_by(&self.customers, |c| &c.user_id == user_id)
            .into_iter()
            .next()
    }

    async fn find_by_customer_id(&self, stripe_customer_id: &str) -> Option<BillingCustomer> {
        find_by(&self.customers, |c| c.stripe_customer_id == stripe_customer_id)
            .into_iter()
            .next()
    }
}

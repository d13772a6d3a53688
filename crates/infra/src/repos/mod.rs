mod billing_customer;
mod invoice;
mod payment_reminder;
mod profile;
mod shared;
mod subscription;

pub use billing_customer::IBillingCustomerRepo;
use billing_customer::{InMemoryBillingCustomerRepo, PostgresBillingCustomerRepo};
pub use invoice::IInvoiceRepo;
use invoice::{InMemoryInvoiceRepo, PostgresInvoiceRepo};
pub use payment_reminder::IPaymentReminderRepo;
use payment_reminder::{InMemoryPaymentReminderRepo, PostgresPaymentReminderRepo};
pub use profile::IProfileRepo;
use profile::{InMemoryProfileRepo, PostgresProfileRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use subscription::ISubscriptionRepo;
use subscription::{InMemorySubscriptionRepo, PostgresSubscriptionRepo};
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub invoices: Arc<dyn IInvoiceRepo>,
    pub payment_reminders: Arc<dyn IPaymentReminderRepo>,
    pub profiles: Arc<dyn IProfileRepo>,
    pub billing_customers: Arc<dyn IBillingCustomerRepo>,
    pub subscriptions: Arc<dyn ISubscriptionRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");
        Ok(Self {
            invoices: Arc::new(PostgresInvoiceRepo::new(pool.clone())),
            payment_reminders: Arc::new(PostgresPaymentReminderRepo::new(pool.clone())),
            profiles: Arc::new(PostgresProfileRepo::new(pool.clone())),
            billing_customers: Arc::new(PostgresBillingCustomerRepo::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            invoices: Arc::new(InMemoryInvoiceRepo::new()),
            payment_reminders: Arc::new(InMemoryPaymentReminderRepo::new()),
            profiles: Arc::new(InMemoryProfileRepo::new()),
            billing_customers: Arc::new(InMemoryBillingCustomerRepo::new()),
            subscriptions: Arc::new(InMemorySubscriptionRepo::new()),
        }
    }
}

mod inmemory;
mod postgres;

pub use inmemory::InMemoryPaymentReminderRepo;
pub use postgres::PostgresPaymentReminderRepo;

use clinic_domain::{PaymentReminder, ID};

#[async_trait::async_trait]
pub trait IPaymentReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &PaymentReminder) -> anyhow::Result<()>;
    /// Reminders of the invoice, newest first
    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentReminder>>;
}

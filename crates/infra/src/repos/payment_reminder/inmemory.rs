use super::IPaymentReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use clinic_domain::{PaymentReminder, ID};

pub struct InMemoryPaymentReminderRepo {
    reminders: std::sync::Mutex<Vec<PaymentReminder>>,
}

impl InMemoryPaymentReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPaymentReminderRepo for InMemoryPaymentReminderRepo {
    async fn insert(&self, reminder: &PaymentReminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentReminder>> {
        let mut reminders = find_by(&self.reminders, |r| &r.invoice_id == invoice_id);
        reminders.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(reminders)
    }
}

use super::IInvoiceRepo;
use crate::repos::shared::inmemory_repo::*;
use clinic_domain::{Invoice, InvoiceStatus, ID, REMINDER_CLAIM_LEASE_MILLIS};

pub struct InMemoryInvoiceRepo {
    invoices: std::sync::Mutex<Vec<Invoice>>,
}

impl InMemoryInvoiceRepo {
    pub fn new() -> Self {
        Self {
            invoices: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IInvoiceRepo for InMemoryInvoiceRepo {
    async fn insert(&self, invoice: &Invoice) -> anyhow::Result<()> {
        insert(invoice, &self.invoices);
        Ok(())
    }

    async fn find(&self, invoice_id: &ID) -> Option<Invoice> {
        find(invoice_id, &self.invoices)
    }

    async fn find_by_statuses(&self, statuses: &[InvoiceStatus]) -> anyhow::Result<Vec<Invoice>> {
        let mut invoices = find_by(&self.invoices, |i| statuses.contains(&i.status));
        invoices.sort_by_key(|i| (i.issue_date, i.created));
        Ok(invoices)
    }

    async fn update_status(
        &self,
        invoice_id: &ID,
        status: InvoiceStatus,
        updated: i64,
    ) -> anyhow::Result<()> {
        update_many(
            &self.invoices,
            |i| &i.id == invoice_id,
            |i| {
                i.status = status;
                i.updated = updated;
            },
        );
        Ok(())
    }

    async fn claim_reminder_stage(
        &self,
        invoice_id: &ID,
        stage: i64,
        now: i64,
    ) -> anyhow::Result<bool> {
        let lease_expired_before = now - REMINDER_CLAIM_LEASE_MILLIS;
        let claimed = update_many(
            &self.invoices,
            |i| {
                &i.id == invoice_id
                    && (i.reminder_stage_claimed < stage
                        || i.reminder_stage_claimed_at <= lease_expired_before)
            },
            |i| {
                i.reminder_stage_claimed = stage;
                i.reminder_stage_claimed_at = now;
            },
        );
        Ok(claimed > 0)
    }

    async fn release_reminder_stage(&self, invoice_id: &ID, stage: i64) -> anyhow::Result<()> {
        update_many(
            &self.invoices,
            |i| &i.id == invoice_id && i.reminder_stage_claimed == stage,
            |i| i.reminder_stage_claimed = stage - 1,
        );
        Ok(())
    }
}

mod inmemory;
mod postgres;

pub use inmemory::InMemoryInvoiceRepo;
pub use postgres::PostgresInvoiceRepo;

use clinic_domain::{Invoice, InvoiceStatus, ID};

#[async_trait::async_trait]
pub trait IInvoiceRepo: Send + Sync {
    async fn insert(&self, invoice: &Invoice) -> anyhow::Result<()>;
    async fn find(&self, invoice_id: &ID) -> Option<Invoice>;
    /// All invoices having one of the given statuses, oldest issue date first
    async fn find_by_statuses(&self, statuses: &[InvoiceStatus]) -> anyhow::Result<Vec<Invoice>>;
    async fn update_status(
        &self,
        invoice_id: &ID,
        status: InvoiceStatus,
        updated: i64,
    ) -> anyhow::Result<()>;
    /// Moves the claimed reminder stage of the invoice forward to `stage`.
    /// A previous claim whose lease has run out by `now` is taken over.
    /// Returns false when the stage is held by a claim that is still leased.
    async fn claim_reminder_stage(
        &self,
        invoice_id: &ID,
        stage: i64,
        now: i64,
    ) -> anyhow::Result<bool>;
    /// Gives back a claim on `stage` that did not lead to a sent reminder
    async fn release_reminder_stage(&self, invoice_id: &ID, stage: i64) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use crate::ClinicContext;
    use chrono::NaiveDate;
    use clinic_domain::{Invoice, InvoiceStatus, ID, REMINDER_CLAIM_LEASE_MILLIS};

    const NOW: i64 = 1_710_936_000_000;

    fn invoice(status: InvoiceStatus, issue_day: u32) -> Invoice {
        let mut invoice = Invoice::new(
            ID::new(),
            format!("INV-{}", issue_day),
            5000,
            NaiveDate::from_ymd_opt(2024, 5, issue_day).unwrap(),
            0,
        );
        invoice.status = status;
        invoice
    }

    #[tokio::test]
    async fn create_and_find() {
        let ctx = ClinicContext::create_inmemory();
        let invoice = invoice(InvoiceStatus::Draft, 1);
        assert!(ctx.repos.invoices.insert(&invoice).await.is_ok());

        let res = ctx.repos.invoices.find(&invoice.id).await.unwrap();
        assert_eq!(res, invoice);
        assert!(ctx.repos.invoices.find(&ID::new()).await.is_none());
    }

    #[tokio::test]
    async fn finds_by_statuses_oldest_first() {
        let ctx = ClinicContext::create_inmemory();
        let overdue = invoice(InvoiceStatus::Overdue, 3);
        let sent = invoice(InvoiceStatus::Sent, 10);
        let paid = invoice(InvoiceStatus::Paid, 1);
        let draft = invoice(InvoiceStatus::Draft, 2);
        for i in &[&sent, &paid, &overdue, &draft] {
            ctx.repos.invoices.insert(i).await.unwrap();
        }

        let res = ctx
            .repos
            .invoices
            .find_by_statuses(&InvoiceStatus::AWAITING_PAYMENT)
            .await
            .unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].id, overdue.id);
        assert_eq!(res[1].id, sent.id);
    }

    #[tokio::test]
    async fn updates_status() {
        let ctx = ClinicContext::create_inmemory();
        let invoice = invoice(InvoiceStatus::Sent, 1);
        ctx.repos.invoices.insert(&invoice).await.unwrap();
        ctx.repos
            .invoices
            .update_status(&invoice.id, InvoiceStatus::Paid, 100)
            .await
            .unwrap();

        let res = ctx.repos.invoices.find(&invoice.id).await.unwrap();
        assert_eq!(res.status, InvoiceStatus::Paid);
        assert_eq!(res.updated, 100);
    }

    #[tokio::test]
    async fn stage_can_only_be_claimed_once() {
        let ctx = ClinicContext::create_inmemory();
        let invoice = invoice(InvoiceStatus::Sent, 1);
        let repo = &ctx.repos.invoices;
        repo.insert(&invoice).await.unwrap();

        assert!(repo.claim_reminder_stage(&invoice.id, 1, NOW).await.unwrap());
        assert!(!repo.claim_reminder_stage(&invoice.id, 1, NOW).await.unwrap());

        // Releasing makes the stage claimable again
        repo.release_reminder_stage(&invoice.id, 1).await.unwrap();
        assert!(repo.claim_reminder_stage(&invoice.id, 1, NOW).await.unwrap());

        // Lower stages can not be claimed after a higher one
        assert!(repo.claim_reminder_stage(&invoice.id, 2, NOW).await.unwrap());
        assert!(!repo.claim_reminder_stage(&invoice.id, 1, NOW).await.unwrap());
        // Releasing a stage that is not the latest claim is a noop
        repo.release_reminder_stage(&invoice.id, 1).await.unwrap();
        let res = repo.find(&invoice.id).await.unwrap();
        assert_eq!(res.reminder_stage_claimed, 2);
        assert_eq!(res.reminder_stage_claimed_at, NOW);

        assert!(!repo.claim_reminder_stage(&ID::new(), 1, NOW).await.unwrap());
    }

    #[tokio::test]
    async fn unrecorded_claim_can_be_taken_over_after_lease() {
        let ctx = ClinicContext::create_inmemory();
        let invoice = invoice(InvoiceStatus::Sent, 1);
        let repo = &ctx.repos.invoices;
        repo.insert(&invoice).await.unwrap();

        assert!(repo.claim_reminder_stage(&invoice.id, 1, NOW).await.unwrap());
        let lease_end = NOW + REMINDER_CLAIM_LEASE_MILLIS;
        assert!(!repo
            .claim_reminder_stage(&invoice.id, 1, lease_end - 1)
            .await
            .unwrap());
        assert!(repo
            .claim_reminder_stage(&invoice.id, 1, lease_end)
            .await
            .unwrap());
        // The takeover starts a new lease
        assert!(!repo
            .claim_reminder_stage(&invoice.id, 1, lease_end + 1)
            .await
            .unwrap());
        assert_eq!(
            repo.find(&invoice.id).await.unwrap().reminder_stage_claimed_at,
            lease_end
        );
    }
}

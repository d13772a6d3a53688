use super::IInvoiceRepo;
use anyhow::anyhow;
use chrono::NaiveDate;
use clinic_domain::{Invoice, InvoiceStatus, ID, REMINDER_CLAIM_LEASE_MILLIS};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresInvoiceRepo {
    pool: PgPool,
}

impl PostgresInvoiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InvoiceRaw {
    invoice_uid: Uuid,
    user_uid: Uuid,
    invoice_number: String,
    patient_name: Option<String>,
    patient_contact: Option<String>,
    amount: i64,
    issue_date: NaiveDate,
    status: String,
    reminder_stage_claimed: i64,
    reminder_stage_claimed_at: i64,
    created: i64,
    updated: i64,
}

impl TryFrom<InvoiceRaw> for Invoice {
    type Error = anyhow::Error;

    fn try_from(e: InvoiceRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: e.invoice_uid.into(),
            user_id: e.user_uid.into(),
            invoice_number: e.invoice_number,
            patient_name: e.patient_name,
            patient_contact: e.patient_contact,
            amount: e.amount,
            issue_date: e.issue_date,
            status: e.status.parse()?,
            reminder_stage_claimed: e.reminder_stage_claimed,
            reminder_stage_claimed_at: e.reminder_stage_claimed_at,
            created: e.created,
            updated: e.updated,
        })
    }
}

const INVOICE_COLUMNS: &str = "invoice_uid, user_uid, invoice_number, patient_name, patient_contact, amount, issue_date, status, reminder_stage_claimed, reminder_stage_claimed_at, created, updated";

#[async_trait::async_trait]
impl IInvoiceRepo for PostgresInvoiceRepo {
    async fn insert(&self, invoice: &Invoice) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invoices(invoice_uid, user_uid, invoice_number, patient_name, patient_contact, amount, issue_date, status, reminder_stage_claimed, reminder_stage_claimed_at, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(invoice.id.inner_ref())
        .bind(invoice.user_id.inner_ref())
        .bind(&invoice.invoice_number)
        .bind(&invoice.patient_name)
        .bind(&invoice.patient_contact)
        .bind(invoice.amount)
        .bind(invoice.issue_date)
        .bind(invoice.status.as_str())
        .bind(invoice.reminder_stage_claimed)
        .bind(invoice.reminder_stage_claimed_at)
        .bind(invoice.created)
        .bind(invoice.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert invoice: {:?}. DB returned error: {:?}",
                invoice, e
            );
            e
        })?;
        Ok(())
    }

    async fn find(&self, invoice_id: &ID) -> Option<Invoice> {
        let res: Option<InvoiceRaw> = sqlx::query_as::<_, InvoiceRaw>(&format!(
            "SELECT {} FROM invoices WHERE invoice_uid = $1",
            INVOICE_COLUMNS
        ))
        .bind(invoice_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find invoice with id: {:?} failed. DB returned error: {:?}",
                invoice_id, e
            );
            e
        })
        .ok()?;
        match res.map(Invoice::try_from) {
            Some(Ok(invoice)) => Some(invoice),
            Some(Err(e)) => {
                error!("Invoice with id: {:?} is corrupt: {:?}", invoice_id, e);
                None
            }
            None => None,
        }
    }

    async fn find_by_statuses(&self, statuses: &[InvoiceStatus]) -> anyhow::Result<Vec<Invoice>> {
        let statuses = statuses.iter().map(|s| s.as_str()).collect::<Vec<_>>();
        let invoices: Vec<InvoiceRaw> = sqlx::query_as::<_, InvoiceRaw>(&format!(
            "SELECT {} FROM invoices WHERE status = ANY($1) ORDER BY issue_date, created",
            INVOICE_COLUMNS
        ))
        .bind(&statuses)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find invoices with statuses: {:?} failed. DB returned error: {:?}",
                statuses, e
            );
            e
        })?;

        invoices.into_iter().map(Invoice::try_from).collect()
    }

    async fn update_status(
        &self,
        invoice_id: &ID,
        status: InvoiceStatus,
        updated: i64,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE invoices SET status = $2, updated = $3 WHERE invoice_uid = $1")
            .bind(invoice_id.inner_ref())
            .bind(status.as_str())
            .bind(updated)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(
                    "Unable to set status: {} of invoice: {:?}. DB returned error: {:?}",
                    status, invoice_id, e
                );
                anyhow!(e)
            })?;
        Ok(())
    }

    async fn claim_reminder_stage(
        &self,
        invoice_id: &ID,
        stage: i64,
        now: i64,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE invoices
            SET reminder_stage_claimed = $2,
            reminder_stage_claimed_at = $3
            WHERE invoice_uid = $1
            AND (reminder_stage_claimed < $2 OR reminder_stage_claimed_at <= $4)
            "#,
        )
        .bind(invoice_id.inner_ref())
        .bind(stage)
        .bind(now)
        .bind(now - REMINDER_CLAIM_LEASE_MILLIS)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to claim reminder stage: {} of invoice: {:?}. DB returned error: {:?}",
                stage, invoice_id, e
            );
            e
        })?;
        Ok(res.rows_affected() == 1)
    }

    async fn release_reminder_stage(&self, invoice_id: &ID, stage: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET reminder_stage_claimed = $2 - 1
            WHERE invoice_uid = $1 AND reminder_stage_claimed = $2
            "#,
        )
        .bind(invoice_id.inner_ref())
        .bind(stage)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to release reminder stage: {} of invoice: {:?}. DB returned error: {:?}",
                stage, invoice_id, e
            );
            e
        })?;
        Ok(())
    }
}

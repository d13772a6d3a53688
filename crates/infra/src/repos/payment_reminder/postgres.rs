use super::IPaymentReminderRepo;
use clinic_domain::{PaymentReminder, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;
use tracing::error;

pub struct PostgresPaymentReminderRepo {
    pool: PgPool,
}

impl PostgresPaymentReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PaymentReminderRaw {
    reminder_uid: Uuid,
    invoice_uid: Uuid,
    sent_at: i64,
    kind: String,
    message: String,
}

impl TryFrom<PaymentReminderRaw> for PaymentReminder {
    type Error = anyhow::Error;

    fn try_from(e: PaymentReminderRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: e.reminder_uid.into(),
            invoice_id: e.invoice_uid.into(),
            sent_at: e.sent_at,
            kind: e.kind.parse()?,
            message: e.message,
        })
    }
}

#[async_trait::async_trait]
impl IPaymentReminderRepo for PostgresPaymentReminderRepo {
    async fn insert(&self, reminder: &PaymentReminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_reminders(reminder_uid, invoice_uid, sent_at, kind, message)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(reminder.invoice_id.inner_ref())
        .bind(reminder.sent_at)
        .bind(reminder.kind.as_str())
        .bind(&reminder.message)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert payment reminder: {:?}. DB returned error: {:?}",
                reminder, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentReminder>> {
        let reminders: Vec<PaymentReminderRaw> = sqlx::query_as::<_, PaymentReminderRaw>(
            r#"
            SELECT reminder_uid, invoice_uid, sent_at, kind, message FROM payment_reminders
            WHERE invoice_uid = $1
            ORDER BY sent_at DESC
            "#,
        )
        .bind(invoice_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find payment reminders of invoice: {:?} failed. DB returned error: {:?}",
                invoice_id, e
            );
            e
        })?;

        reminders.into_iter().map(PaymentReminder::try_from).collect()
    }
}

use chrono::NaiveDate;
use clinic_domain::{Invoice, InvoiceStatus, PaymentReminder, ReminderKind, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDTO {
    pub id: ID,
    pub user_id: ID,
    pub invoice_number: String,
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    pub amount: i64,
    pub issue_date: NaiveDate,
    pub status: InvoiceStatus,
    pub created: i64,
    pub updated: i64,
}

impl InvoiceDTO {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            user_id: invoice.user_id,
            invoice_number: invoice.invoice_number,
            patient_name: invoice.patient_name,
            patient_contact: invoice.patient_contact,
            amount: invoice.amount,
            issue_date: invoice.issue_date,
            status: invoice.status,
            created: invoice.created,
            updated: invoice.updated,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReminderDTO {
    pub id: ID,
    pub invoice_id: ID,
    pub sent_at: i64,
    pub kind: ReminderKind,
    pub message: String,
}

impl PaymentReminderDTO {
    pub fn new(reminder: PaymentReminder) -> Self {
        Self {
            id: reminder.id,
            invoice_id: reminder.invoice_id,
            sent_at: reminder.sent_at,
            kind: reminder.kind,
            message: reminder.message,
        }
    }
}

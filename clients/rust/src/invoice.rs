use crate::{APIResponse, BaseClient};
use chrono::NaiveDate;
use clinic_api_structs::*;
use clinic_domain::{InvoiceStatus, NotificationChannel, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct InvoiceClient {
    base: Arc<BaseClient>,
}

pub struct CreateInvoiceInput {
    pub invoice_number: String,
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    /// Amount in pence
    pub amount: i64,
    pub issue_date: NaiveDate,
    pub status: Option<InvoiceStatus>,
}

pub struct SendInvoiceInput {
    pub invoice_id: ID,
    /// Both channels when not given
    pub channels: Option<Vec<NotificationChannel>>,
}

impl InvoiceClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateInvoiceInput) -> APIResponse<create_invoice::APIResponse> {
        let body = create_invoice::RequestBody {
            invoice_number: input.invoice_number,
            patient_name: input.patient_name,
            patient_contact: input.patient_contact,
            amount: input.amount,
            issue_date: input.issue_date,
            status: input.status,
        };
        self.base
            .post(body, "invoices".into(), StatusCode::CREATED)
            .await
    }

    pub async fn get(&self, invoice_id: &ID) -> APIResponse<get_invoice::APIResponse> {
        self.base
            .get(format!("invoices/{}", invoice_id), StatusCode::OK)
            .await
    }

    pub async fn get_reminders(
        &self,
        invoice_id: &ID,
    ) -> APIResponse<get_invoice_reminders::APIResponse> {
        self.base
            .get(format!("invoices/{}/reminders", invoice_id), StatusCode::OK)
            .await
    }

    pub async fn mark_paid(&self, invoice_id: &ID) -> APIResponse<mark_invoice_paid::APIResponse> {
        self.base
            .put((), format!("invoices/{}/paid", invoice_id), StatusCode::OK)
            .await
    }

    pub async fn send(&self, input: SendInvoiceInput) -> APIResponse<send_invoice::APIResponse> {
        let body = send_invoice::RequestBody {
            channels: input.channels,
        };
        self.base
            .post(
                body,
                format!("invoices/{}/send", input.invoice_id),
                StatusCode::OK,
            )
            .await
    }
}

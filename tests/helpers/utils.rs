use chrono::{Duration, NaiveDate, Utc};
use clinic_sdk::{ClinicSDK, CreateInvoiceInput, Invoice};

pub fn days_ago(days: i64) -> NaiveDate {
    (Utc::now() - Duration::days(days)).date_naive()
}

pub async fn create_invoice(
    sdk: &ClinicSDK,
    number: &str,
    contact: Option<&str>,
    issue_date: NaiveDate,
) -> Invoice {
    sdk.invoice
        .create(CreateInvoiceInput {
            invoice_number: number.into(),
            patient_name: Some("Sam Patient".into()),
            patient_contact: contact.map(String::from),
            amount: 6500,
            issue_date,
            status: None,
        })
        .await
        .expect("Expected to create invoice")
        .invoice
}

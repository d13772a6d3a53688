use crate::dtos::{InvoiceDTO, PaymentReminderDTO};
use clinic_domain::{Invoice, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub invoice: InvoiceDTO,
}

impl InvoiceResponse {
    pub fn new(invoice: Invoice) -> Self {
        Self {
            invoice: InvoiceDTO::new(invoice),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InvoicePathParams {
    pub invoice_id: ID,
}

pub mod create_invoice {
    use super::*;
    use chrono::NaiveDate;
    use clinic_domain::InvoiceStatus;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub invoice_number: String,
        #[serde(default)]
        pub patient_name: Option<String>,
        /// Phone number or email address of the patient
        #[serde(default)]
        pub patient_contact: Option<String>,
        /// Amount in pence
        pub amount: i64,
        pub issue_date: NaiveDate,
        #[serde(default)]
        pub status: Option<InvoiceStatus>,
    }

    pub type APIResponse = InvoiceResponse;
}

pub mod get_invoice {
    use super::*;

    pub type PathParams = InvoicePathParams;

    pub type APIResponse = InvoiceResponse;
}

pub mod get_invoice_reminders {
    use super::*;
    use clinic_domain::PaymentReminder;

    pub type PathParams = InvoicePathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<PaymentReminderDTO>,
    }

    impl APIResponse {
        pub fn new(reminders: Vec<PaymentReminder>) -> Self {
            Self {
                reminders: reminders.into_iter().map(PaymentReminderDTO::new).collect(),
            }
        }
    }
}

pub mod mark_invoice_paid {
    use super::*;

    pub type PathParams = InvoicePathParams;

    pub type APIResponse = InvoiceResponse;
}

pub mod send_invoice {
    use super::*;
    use clinic_domain::{ChannelOutcome, NotificationChannel};

    pub type PathParams = InvoicePathParams;

    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// Channels to deliver the invoice over, both when not given
        #[serde(default)]
        pub channels: Option<Vec<NotificationChannel>>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub invoice: InvoiceDTO,
        pub sms: ChannelOutcome,
        pub email: ChannelOutcome,
    }

    impl APIResponse {
        pub fn new(invoice: Invoice, sms: ChannelOutcome, email: ChannelOutcome) -> Self {
            Self {
                invoice: InvoiceDTO::new(invoice),
                sms,
                email,
            }
        }
    }
}

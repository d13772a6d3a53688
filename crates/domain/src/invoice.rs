use crate::shared::entity::{Entity, ID};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

pub const DAY_MILLIS: i64 = 1000 * 60 * 60 * 24;
/// How long a claimed reminder stage stays reserved for the run that claimed it
pub const REMINDER_CLAIM_LEASE_MILLIS: i64 = DAY_MILLIS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Overdue,
    Paid,
    Canceled,
}

impl InvoiceStatus {
    /// Statuses of invoices that still wait for payment and are
    /// therefore candidates for follow-up reminders
    pub const AWAITING_PAYMENT: [InvoiceStatus; 2] = [InvoiceStatus::Sent, InvoiceStatus::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Overdue => "overdue",
            Self::Paid => "paid",
            Self::Canceled => "canceled",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Paid | Self::Canceled)
    }
}

impl Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid invoice status: {0}")]
pub struct InvalidInvoiceStatus(String);

impl FromStr for InvoiceStatus {
    type Err = InvalidInvoiceStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "sent" => Ok(Self::Sent),
            "overdue" => Ok(Self::Overdue),
            "paid" => Ok(Self::Paid),
            "canceled" => Ok(Self::Canceled),
            _ => Err(InvalidInvoiceStatus(s.to_string())),
        }
    }
}

/// An `Invoice` issued by a clinic user to one of its patients.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: ID,
    /// The clinic user owning the `Invoice`
    pub user_id: ID,
    pub invoice_number: String,
    pub patient_name: Option<String>,
    /// Phone number or email address of the patient
    pub patient_contact: Option<String>,
    /// Amount in minor currency units (pence)
    pub amount: i64,
    pub issue_date: NaiveDate,
    pub status: InvoiceStatus,
    /// Highest follow-up stage a scheduler run has claimed for this `Invoice`.
    /// A run may only send the reminder for a stage after it has moved this
    /// value forward, so overlapping runs cannot both send the same stage.
    pub reminder_stage_claimed: i64,
    /// When `reminder_stage_claimed` was last moved. A claim older than
    /// `REMINDER_CLAIM_LEASE_MILLIS` can be taken over by another run.
    pub reminder_stage_claimed_at: i64,
    pub created: i64,
    pub updated: i64,
}

impl Entity for Invoice {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl Invoice {
    pub fn new(user_id: ID, invoice_number: String, amount: i64, issue_date: NaiveDate, now: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            invoice_number,
            patient_name: None,
            patient_contact: None,
            amount,
            issue_date,
            status: InvoiceStatus::Draft,
            reminder_stage_claimed: 0,
            reminder_stage_claimed_at: 0,
            created: now,
            updated: now,
        }
    }

    /// The patient contact, if one is present and not blank
    pub fn contact(&self) -> Option<&str> {
        self.patient_contact
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    pub fn has_email_contact(&self) -> bool {
        self.contact().map(|c| c.contains('@')).unwrap_or(false)
    }

    /// Midnight UTC of the issue date
    pub fn issued_at_millis(&self) -> i64 {
        Utc.from_utc_datetime(&self.issue_date.and_time(NaiveTime::MIN))
            .timestamp_millis()
    }

    /// Whole days elapsed since the issue date, rounded down
    pub fn days_since_issue(&self, now: i64) -> i64 {
        (now - self.issued_at_millis()).div_euclid(DAY_MILLIS)
    }

    pub fn formatted_amount(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let amount = self.amount.abs();
        format!("{}£{}.{:02}", sign, amount / 100, amount % 100)
    }
}

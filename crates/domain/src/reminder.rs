use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    /// The first notification of the `Invoice`, stage 0
    Initial,
    Followup,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Followup => "followup",
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid reminder kind: {0}")]
pub struct InvalidReminderKind(String);

impl FromStr for ReminderKind {
    type Err = InvalidReminderKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initial" => Ok(Self::Initial),
            "followup" => Ok(Self::Followup),
            _ => Err(InvalidReminderKind(s.to_string())),
        }
    }
}

/// A `PaymentReminder` is a record of a payment notification sent
/// to the patient of an `Invoice`. Reminders are only ever appended,
/// the number of them decides which follow-up stage comes next.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReminder {
    pub id: ID,
    pub invoice_id: ID,
    /// Timestamp in millis when the reminder was sent
    pub sent_at: i64,
    pub kind: ReminderKind,
    /// The message delivered to the patient
    pub message: String,
}

impl Entity for PaymentReminder {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl PaymentReminder {
    pub fn new(invoice_id: ID, kind: ReminderKind, message: String, sent_at: i64) -> Self {
        Self {
            id: Default::default(),
            invoice_id,
            sent_at,
            kind,
            message,
        }
    }
}

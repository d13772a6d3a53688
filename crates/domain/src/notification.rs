use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    Sms,
    Email,
}

impl NotificationChannel {
    pub const ALL: [NotificationChannel; 2] = [NotificationChannel::Sms, NotificationChannel::Email];
}

/// Result of delivering an `Invoice` over a single channel. Channels
/// are independent, a failed channel never affects the other one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelOutcome {
    /// Delivered, `id` is the provider id of the message
    Sent { id: String },
    Failed { error: String },
    /// The channel was not used for this invoice
    NotApplicable { note: String },
}

impl ChannelOutcome {
    pub fn not_applicable(note: &str) -> Self {
        Self::NotApplicable {
            note: note.to_string(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

use crate::invoice::{Invoice, InvoiceStatus, DAY_MILLIS};
use crate::reminder::PaymentReminder;

/// Cadence of the overdue payment reminders sent after the initial
/// notification of an `Invoice`.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowupPolicy {
    /// Days after the issue date at which each follow-up stage becomes
    /// eligible. Index 0 is the first follow-up.
    pub offset_days: Vec<i64>,
    /// Maximum number of follow-ups sent for a single `Invoice`
    pub max_followups: usize,
    /// A follow-up sent this many days after the previous reminder
    /// marks the `Invoice` as overdue
    pub overdue_after_days: i64,
}

impl Default for FollowupPolicy {
    fn default() -> Self {
        Self {
            offset_days: vec![7, 14, 30],
            max_followups: 3,
            overdue_after_days: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The initial notification has not been sent yet
    NotYetNotified,
    MaxFollowupsReached,
    /// There is no offset configured for the next stage
    NoRemainingStage,
    TooEarly {
        days_since_issue: i64,
        required_days: i64,
    },
    /// The latest reminder was sent less than a day ago
    RecentlyReminded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowupPlan {
    /// Stage of the reminder about to be sent, equal to the number of
    /// reminders already sent. The initial notification is stage 0.
    pub stage: i64,
    pub followup_index: usize,
    pub days_since_issue: i64,
    /// Whether the `Invoice` should become overdue once the follow-up is sent
    pub mark_overdue: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FollowupDecision {
    Send(FollowupPlan),
    Skip(SkipReason),
}

impl FollowupPolicy {
    /// Decides whether a follow-up should be sent for the `Invoice` given its
    /// reminder history and the current time in millis.
    pub fn decide(
        &self,
        invoice: &Invoice,
        reminders: &[PaymentReminder],
        now: i64,
    ) -> FollowupDecision {
        let reminder_count = reminders.len();
        let followup_index = match reminder_count.checked_sub(1) {
            Some(index) => index,
            None => return FollowupDecision::Skip(SkipReason::NotYetNotified),
        };
        if followup_index >= self.max_followups {
            return FollowupDecision::Skip(SkipReason::MaxFollowupsReached);
        }
        let required_days = match self.offset_days.get(followup_index) {
            Some(days) => *days,
            None => return FollowupDecision::Skip(SkipReason::NoRemainingStage),
        };

        let days_since_issue = invoice.days_since_issue(now);
        if days_since_issue < required_days {
            return FollowupDecision::Skip(SkipReason::TooEarly {
                days_since_issue,
                required_days,
            });
        }

        let latest_sent_at = reminders.iter().map(|r| r.sent_at).max();
        if let Some(sent_at) = latest_sent_at {
            if now - sent_at < DAY_MILLIS {
                return FollowupDecision::Skip(SkipReason::RecentlyReminded);
            }
        }

        let mark_overdue = invoice.status != InvoiceStatus::Overdue
            && latest_sent_at
                .map(|sent_at| now - sent_at > self.overdue_after_days * DAY_MILLIS)
                .unwrap_or(false);

        FollowupDecision::Send(FollowupPlan {
            stage: reminder_count as i64,
            followup_index,
            days_since_issue,
            mark_overdue,
        })
    }
}

/// Aggregated result of one scheduler run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowupRunSummary {
    pub processed: usize,
    pub sent: usize,
    pub skipped: usize,
    pub errors: Vec<String>,
}

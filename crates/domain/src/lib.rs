mod consultant;
mod followup;
mod invoice;
mod notification;
mod profile;
mod reminder;
mod shared;
mod subscription;
pub mod templates;
mod webhook;

pub use consultant::{consultant_user_prompt, CONSULTANT_SYSTEM_PROMPT};
pub use followup::{
    FollowupDecision, FollowupPlan, FollowupPolicy, FollowupRunSummary, SkipReason,
};
pub use invoice::{InvalidInvoiceStatus, Invoice, InvoiceStatus, DAY_MILLIS, REMINDER_CLAIM_LEASE_MILLIS};
pub use notification::{ChannelOutcome, NotificationChannel};
pub use profile::{BankDetails, Profile};
pub use reminder::{InvalidReminderKind, PaymentReminder, ReminderKind};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use subscription::{BillingCustomer, Subscription};
pub use webhook::{
    sign_stripe_payload, verify_stripe_signature, SignatureError, WEBHOOK_TOLERANCE_SECS,
};

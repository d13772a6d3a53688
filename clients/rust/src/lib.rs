mod base;
mod billing;
mod consultant;
mod followup;
mod invoice;
mod status;
mod user;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
use billing::BillingClient;
pub use billing::CreateCheckoutSessionInput;
pub use clinic_api_structs::dtos::*;
pub use clinic_domain::{ChannelOutcome, InvoiceStatus, NotificationChannel, ReminderKind, ID};
use consultant::ConsultantClient;
use followup::FollowupClient;
use invoice::InvoiceClient;
pub use invoice::{CreateInvoiceInput, SendInvoiceInput};
use status::StatusClient;
use std::sync::Arc;
use user::UserClient;

// Domain
pub use clinic_api_structs::dtos::InvoiceDTO as Invoice;
pub use clinic_api_structs::dtos::PaymentReminderDTO as PaymentReminder;
pub use clinic_api_structs::dtos::ProfileDTO as Profile;
pub use clinic_api_structs::dtos::SubscriptionDTO as Subscription;

/// Header carrying the key of the follow-up scheduler trigger
pub const FOLLOWUP_KEY_HEADER: &str = "x-followup-key";

/// Clinic Billing Server SDK
///
/// The SDK contains methods for interacting with the clinic billing server
/// API on behalf of a clinic user.
#[derive(Clone)]
pub struct ClinicSDK {
    pub billing: BillingClient,
    pub consultant: ConsultantClient,
    pub followup: FollowupClient,
    pub invoice: InvoiceClient,
    pub status: StatusClient,
    pub user: UserClient,
}

impl ClinicSDK {
    /// `token` is the bearer access token of the clinic user, it may be empty
    /// for the routes that are not user authenticated
    pub fn new<T: Into<String>>(address: String, token: T) -> Self {
        let mut base = BaseClient::new(address);
        let token = token.into();
        if !token.is_empty() {
            base.set_token(token);
        }
        let base = Arc::new(base);
        let billing = BillingClient::new(base.clone());
        let consultant = ConsultantClient::new(base.clone());
        let followup = FollowupClient::new(base.clone());
        let invoice = InvoiceClient::new(base.clone());
        let status = StatusClient::new(base.clone());
        let user = UserClient::new(base);

        Self {
            billing,
            consultant,
            followup,
            invoice,
            status,
            user,
        }
    }
}

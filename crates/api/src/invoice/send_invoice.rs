use super::find_user_invoice;
use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::send_invoice::{APIResponse, PathParams, RequestBody};
use clinic_domain::{
    templates, ChannelOutcome, Invoice, InvoiceStatus, NotificationChannel, PaymentReminder,
    Profile, ReminderKind, ID,
};
use clinic_infra::{ClinicContext, EmailMessage, SmsMessage};
use tracing::error;

pub async fn send_invoice_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: Option<web::Json<RequestBody>>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let channels = body
        .and_then(|body| body.0.channels)
        .unwrap_or_else(|| NotificationChannel::ALL.to_vec());
    let usecase = SendInvoiceUseCase {
        user_id: user.id,
        invoice_id: path.invoice_id.clone(),
        channels,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.invoice, res.sms, res.email)))
        .map_err(ClinicError::from)
}

/// Delivers an invoice to the patient over SMS and/or email
#[derive(Debug)]
pub struct SendInvoiceUseCase {
    pub user_id: ID,
    pub invoice_id: ID,
    pub channels: Vec<NotificationChannel>,
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub invoice: Invoice,
    pub sms: ChannelOutcome,
    pub email: ChannelOutcome,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    InvoiceClosed(InvoiceStatus),
    /// No channel could be used for the invoice
    NoApplicableChannel(Vec<String>),
    /// Every attempted channel failed
    AllChannelsFailed(Vec<String>),
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(invoice_id) => Self::NotFound(format!(
                "The invoice with id: {}, was not found.",
                invoice_id
            )),
            UseCaseError::InvoiceClosed(status) => Self::BadClientData(format!(
                "The invoice is {} and can not be sent",
                status
            )),
            UseCaseError::NoApplicableChannel(notes) => Self::BadClientData(format!(
                "The invoice could not be sent over any channel: {}",
                notes.join(", ")
            )),
            UseCaseError::AllChannelsFailed(errors) => Self::BadGateway(errors.join(", ")),
        }
    }
}

const NOT_REQUESTED: &str = "channel not requested";

#[async_trait::async_trait(?Send)]
impl UseCase for SendInvoiceUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "SendInvoice";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let mut invoice = find_user_invoice(&self.user_id, &self.invoice_id, ctx)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.invoice_id.clone()))?;
        if invoice.status.is_closed() {
            return Err(UseCaseError::InvoiceClosed(invoice.status));
        }

        let profile = ctx.repos.profiles.find(&invoice.user_id).await;

        let (sms, sms_body) = if self.channels.contains(&NotificationChannel::Sms) {
            send_sms(&invoice, profile.as_ref(), ctx).await
        } else {
            (ChannelOutcome::not_applicable(NOT_REQUESTED), None)
        };
        let (email, email_subject) = if self.channels.contains(&NotificationChannel::Email) {
            send_email(&invoice, profile.as_ref(), ctx).await
        } else {
            (ChannelOutcome::not_applicable(NOT_REQUESTED), None)
        };

        let message = match (sms_body, email_subject) {
            (Some(body), _) => body,
            (None, Some(subject)) => subject,
            (None, None) => {
                let details = |outcome: &ChannelOutcome| match outcome {
                    ChannelOutcome::Failed { error } => Some(error.clone()),
                    ChannelOutcome::NotApplicable { note } => Some(note.clone()),
                    ChannelOutcome::Sent { .. } => None,
                };
                let details = vec![details(&sms), details(&email)]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>();
                return if sms.is_failed() || email.is_failed() {
                    Err(UseCaseError::AllChannelsFailed(details))
                } else {
                    Err(UseCaseError::NoApplicableChannel(details))
                };
            }
        };

        let now = ctx.sys.get_timestamp_millis();
        if invoice.status == InvoiceStatus::Draft {
            invoice.status = InvoiceStatus::Sent;
            invoice.updated = now;
            if let Err(e) = ctx
                .repos
                .invoices
                .update_status(&invoice.id, invoice.status, now)
                .await
            {
                error!(
                    "Invoice {} was delivered but its status could not be updated: {:?}",
                    invoice.invoice_number, e
                );
            }
        }
        record_initial_reminder(&invoice, message, now, ctx).await;

        Ok(UseCaseResponse {
            invoice,
            sms,
            email,
        })
    }
}

/// The first delivery starts the follow-up cadence, later manual re-sends do not
async fn record_initial_reminder(invoice: &Invoice, message: String, now: i64, ctx: &ClinicContext) {
    match ctx.repos.payment_reminders.find_by_invoice(&invoice.id).await {
        Ok(reminders) if reminders.is_empty() => {
            let reminder =
                PaymentReminder::new(invoice.id.clone(), ReminderKind::Initial, message, now);
            if let Err(e) = ctx.repos.payment_reminders.insert(&reminder).await {
                error!(
                    "Unable to record the initial reminder of invoice {}: {:?}",
                    invoice.invoice_number, e
                );
            }
        }
        Ok(_) => (),
        Err(e) => error!(
            "Unable to load the reminders of invoice {}: {:?}",
            invoice.invoice_number, e
        ),
    }
}

async fn send_sms(
    invoice: &Invoice,
    profile: Option<&Profile>,
    ctx: &ClinicContext,
) -> (ChannelOutcome, Option<String>) {
    let sms = match &ctx.services.sms {
        Some(sms) => sms,
        None => return (ChannelOutcome::not_applicable("SMS provider not configured"), None),
    };
    let to = match invoice.contact() {
        Some(contact) if !invoice.has_email_contact() => contact,
        Some(_) => {
            return (
                ChannelOutcome::not_applicable("patient contact is not a phone number"),
                None,
            )
        }
        None => return (ChannelOutcome::not_applicable("no patient contact"), None),
    };

    let message = SmsMessage {
        to: to.to_string(),
        body: templates::initial_sms(invoice, profile),
    };
    match sms.send(&message).await {
        Ok(id) => (ChannelOutcome::Sent { id }, Some(message.body)),
        Err(e) => (
            ChannelOutcome::Failed {
                error: format!("SMS: {}", e),
            },
            None,
        ),
    }
}

async fn send_email(
    invoice: &Invoice,
    profile: Option<&Profile>,
    ctx: &ClinicContext,
) -> (ChannelOutcome, Option<String>) {
    let to = match invoice.contact() {
        Some(contact) if invoice.has_email_contact() => contact,
        _ => {
            return (
                ChannelOutcome::not_applicable("patient contact is not an email address"),
                None,
            )
        }
    };
    let email = match &ctx.services.email {
        Some(email) => email,
        None => return (ChannelOutcome::not_applicable("email provider not configured"), None),
    };

    let content = match templates::invoice_email(invoice, profile) {
        Ok(content) => content,
        Err(e) => {
            error!(
                "Unable to render email of invoice {}: {:?}",
                invoice.invoice_number, e
            );
            return (
                ChannelOutcome::Failed {
                    error: format!("Email: {}", e),
                },
                None,
            );
        }
    };
    let message = EmailMessage {
        to: to.to_string(),
        subject: content.subject,
        html: content.html,
    };
    match email.send(&message).await {
        Ok(id) => (ChannelOutcome::Sent { id }, Some(message.subject)),
        Err(e) => (
            ChannelOutcome::Failed {
                error: format!("Email: {}", e),
            },
            None,
        ),
    }
}

use crate::error::ClinicError;
use crate::shared::{
    auth::protect_followup_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::check_and_send_followups::APIResponse;
use clinic_domain::{
    templates, FollowupDecision, FollowupPlan, FollowupRunSummary, Invoice, InvoiceStatus,
    PaymentReminder, ReminderKind,
};
use clinic_infra::{ClinicContext, ISmsProvider, SmsMessage};
use tracing::{debug, error, info, warn};

pub async fn check_and_send_followups_controller(
    http_req: HttpRequest,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    protect_followup_route(&http_req, &ctx)?;

    execute(CheckAndSendFollowupsUseCase {}, &ctx)
        .await
        .map(|summary| HttpResponse::Ok().json(APIResponse::new(summary)))
        .map_err(ClinicError::from)
}

/// Sends the next due follow-up SMS of every invoice awaiting payment
#[derive(Debug)]
pub struct CheckAndSendFollowupsUseCase {}

#[derive(Debug)]
pub enum UseCaseError {
    SmsProviderNotConfigured,
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::SmsProviderNotConfigured => {
                Self::ServiceUnavailable("SMS provider is not configured".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

enum InvoiceOutcome {
    Sent,
    Skipped,
}

#[async_trait::async_trait(?Send)]
impl UseCase for CheckAndSendFollowupsUseCase {
    type Response = FollowupRunSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "CheckAndSendFollowups";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let sms = ctx
            .services
            .sms
            .clone()
            .ok_or(UseCaseError::SmsProviderNotConfigured)?;

        let invoices = ctx
            .repos
            .invoices
            .find_by_statuses(&InvoiceStatus::AWAITING_PAYMENT)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let mut summary = FollowupRunSummary::default();
        for invoice in &invoices {
            summary.processed += 1;
            match process_invoice(invoice, sms.as_ref(), ctx).await {
                Ok(InvoiceOutcome::Sent) => summary.sent += 1,
                Ok(InvoiceOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    warn!("{}", e);
                    summary.errors.push(e);
                }
            }
        }

        info!(
            "Follow-up run done. Processed: {}, sent: {}, skipped: {}, errors: {}",
            summary.processed,
            summary.sent,
            summary.skipped,
            summary.errors.len()
        );
        Ok(summary)
    }
}

async fn process_invoice(
    invoice: &Invoice,
    sms: &dyn ISmsProvider,
    ctx: &ClinicContext,
) -> Result<InvoiceOutcome, String> {
    let now = ctx.sys.get_timestamp_millis();
    let reminders = ctx
        .repos
        .payment_reminders
        .find_by_invoice(&invoice.id)
        .await
        .map_err(|_| {
            format!(
                "Invoice {}: unable to load reminder history",
                invoice.invoice_number
            )
        })?;

    let plan = match ctx.config.followups.decide(invoice, &reminders, now) {
        FollowupDecision::Send(plan) => plan,
        FollowupDecision::Skip(_) => return Ok(InvoiceOutcome::Skipped),
    };

    let to = invoice
        .contact()
        .ok_or_else(|| format!("Invoice {}: no patient contact", invoice.invoice_number))?;

    let claimed = ctx
        .repos
        .invoices
        .claim_reminder_stage(&invoice.id, plan.stage, now)
        .await
        .map_err(|_| {
            format!(
                "Invoice {}: unable to claim follow-up stage {}",
                invoice.invoice_number, plan.stage
            )
        })?;
    if !claimed {
        // Another run holds the lease on this stage
        debug!(
            "Follow-up stage {} of invoice {} is claimed by another run",
            plan.stage, invoice.invoice_number
        );
        return Ok(InvoiceOutcome::Skipped);
    }

    let profile = ctx.repos.profiles.find(&invoice.user_id).await;
    let body = templates::followup_sms(invoice, profile.as_ref(), plan.days_since_issue);
    let message = SmsMessage {
        to: to.to_string(),
        body,
    };

    if let Err(e) = sms.send(&message).await {
        release_stage(invoice, &plan, ctx).await;
        return Err(format!(
            "Invoice {}: failed to send follow-up SMS: {}",
            invoice.invoice_number, e
        ));
    }

    record_followup(invoice, &plan, message.body, ctx).await?;
    Ok(InvoiceOutcome::Sent)
}

async fn release_stage(invoice: &Invoice, plan: &FollowupPlan, ctx: &ClinicContext) {
    if let Err(e) = ctx
        .repos
        .invoices
        .release_reminder_stage(&invoice.id, plan.stage)
        .await
    {
        error!(
            "Unable to release follow-up stage {} of invoice {}: {:?}",
            plan.stage, invoice.invoice_number, e
        );
    }
}

async fn record_followup(
    invoice: &Invoice,
    plan: &FollowupPlan,
    message: String,
    ctx: &ClinicContext,
) -> Result<(), String> {
    let sent_at = ctx.sys.get_timestamp_millis();
    let reminder = PaymentReminder::new(invoice.id.clone(), ReminderKind::Followup, message, sent_at);
    ctx.repos
        .payment_reminders
        .insert(&reminder)
        .await
        .map_err(|_| {
            format!(
                "Invoice {}: follow-up SMS was sent but could not be recorded",
                invoice.invoice_number
            )
        })?;

    if plan.mark_overdue {
        if let Err(e) = ctx
            .repos
            .invoices
            .update_status(&invoice.id, InvoiceStatus::Overdue, sent_at)
            .await
        {
            error!(
                "Unable to mark invoice {} as overdue: {:?}",
                invoice.invoice_number, e
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use clinic_domain::{Profile, DAY_MILLIS, ID};
    use clinic_infra::{IPaymentReminderRepo, ISys, InMemorySmsProvider};
    use std::sync::{Arc, Mutex};

    /// 2024-03-20T12:00:00Z
    const NOW: i64 = 1_710_936_000_000;

    struct StaticTimeSys(i64);
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    struct TestContext {
        ctx: ClinicContext,
        sms: Arc<InMemorySmsProvider>,
        user_id: ID,
    }

    fn setup_at(now: i64) -> TestContext {
        let mut ctx = ClinicContext::create_inmemory();
        ctx.sys = Arc::new(StaticTimeSys(now));
        let sms = Arc::new(InMemorySmsProvider::new());
        ctx.services.sms = Some(sms.clone());
        TestContext {
            ctx,
            sms,
            user_id: ID::new(),
        }
    }

    fn setup() -> TestContext {
        setup_at(NOW)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    /// Inserts a sent invoice issued `days_ago` with reminders sent the given days ago
    async fn insert_invoice(
        test: &TestContext,
        number: &str,
        days_ago: i64,
        contact: Option<&str>,
        reminders_days_ago: &[i64],
    ) -> Invoice {
        let mut invoice = Invoice::new(
            test.user_id.clone(),
            number.into(),
            6500,
            today() - Duration::days(days_ago),
            0,
        );
        invoice.status = InvoiceStatus::Sent;
        invoice.patient_name = Some("Sam".into());
        invoice.patient_contact = contact.map(String::from);
        test.ctx.repos.invoices.insert(&invoice).await.unwrap();

        for (i, days) in reminders_days_ago.iter().enumerate() {
            let kind = if i == 0 {
                ReminderKind::Initial
            } else {
                ReminderKind::Followup
            };
            let reminder = PaymentReminder::new(
                invoice.id.clone(),
                kind,
                "reminder".into(),
                NOW - days * DAY_MILLIS,
            );
            test.ctx
                .repos
                .payment_reminders
                .insert(&reminder)
                .await
                .unwrap();
        }
        invoice
    }

    /// Reminder repo whose first `failures` inserts fail
    struct FailingReminderRepo {
        inner: Arc<dyn IPaymentReminderRepo>,
        failures: Mutex<usize>,
    }

    #[async_trait::async_trait]
    impl IPaymentReminderRepo for FailingReminderRepo {
        async fn insert(&self, reminder: &PaymentReminder) -> anyhow::Result<()> {
            {
                let mut failures = self.failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(anyhow::anyhow!("connection reset"));
                }
            }
            self.inner.insert(reminder).await
        }

        async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentReminder>> {
            self.inner.find_by_invoice(invoice_id).await
        }
    }

    async fn run(test: &TestContext) -> Result<FollowupRunSummary, UseCaseError> {
        let mut usecase = CheckAndSendFollowupsUseCase {};
        usecase.execute(&test.ctx).await
    }

    #[actix_web::test]
    async fn sends_first_followup_when_offset_has_passed() {
        let test = setup();
        let mut profile = Profile::new(test.user_id.clone());
        profile.clinic_name = Some("Riverside Physio".into());
        profile.bank_name = Some("Monzo".into());
        profile.bank_account_number = Some("12345678".into());
        profile.bank_sort_code = Some("04-00-04".into());
        test.ctx.repos.profiles.upsert(&profile).await.unwrap();
        let invoice = insert_invoice(&test, "INV-1", 10, Some("+447700900123"), &[10]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(
            summary,
            FollowupRunSummary {
                processed: 1,
                sent: 1,
                skipped: 0,
                errors: vec![],
            }
        );

        let sent = test.sms.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "+447700900123");
        assert!(sent[0].body.contains("Riverside Physio"));
        assert!(sent[0].body.contains("issued 10 days ago"));
        assert!(sent[0].body.contains("sort code 04-00-04"));

        let reminders = test
            .ctx
            .repos
            .payment_reminders
            .find_by_invoice(&invoice.id)
            .await
            .unwrap();
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].kind, ReminderKind::Followup);
        assert_eq!(reminders[0].sent_at, NOW);
        assert_eq!(reminders[0].message, sent[0].body);
    }

    #[actix_web::test]
    async fn skips_invoice_before_first_offset() {
        let test = setup();
        insert_invoice(&test, "INV-1", 5, Some("+447700900123"), &[5]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.sent, 0);
        assert!(test.sms.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn skips_invoice_with_all_followups_sent() {
        let test = setup();
        insert_invoice(&test, "INV-1", 90, Some("+447700900123"), &[90, 83, 76, 60]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(test.sms.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn skips_invoice_reminded_today() {
        let test = setup();
        // Long past the first offset, but the initial reminder was sent today
        insert_invoice(&test, "INV-1", 20, Some("+447700900123"), &[0]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(test.sms.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn missing_contact_does_not_abort_the_run() {
        let test = setup();
        insert_invoice(&test, "INV-1", 10, None, &[10]).await;
        insert_invoice(&test, "INV-2", 10, Some("  "), &[10]).await;
        insert_invoice(&test, "INV-3", 10, Some("+447700900123"), &[10]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.sent, 1);
        assert_eq!(
            summary.errors,
            vec![
                "Invoice INV-1: no patient contact".to_string(),
                "Invoice INV-2: no patient contact".to_string()
            ]
        );
        assert_eq!(test.sms.sent_messages().len(), 1);
    }

    #[actix_web::test]
    async fn provider_failure_is_collected_and_stage_released() {
        let test = setup();
        test.sms.fail_for("+447700900999");
        let failing = insert_invoice(&test, "INV-1", 10, Some("+447700900999"), &[10]).await;
        insert_invoice(&test, "INV-2", 10, Some("+447700900123"), &[10]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("Invoice INV-1: failed to send follow-up SMS"));

        // No reminder was recorded and the stage can be sent by a later run
        let reminders = test
            .ctx
            .repos
            .payment_reminders
            .find_by_invoice(&failing.id)
            .await
            .unwrap();
        assert_eq!(reminders.len(), 1);
        let failing = test.ctx.repos.invoices.find(&failing.id).await.unwrap();
        assert_eq!(failing.reminder_stage_claimed, 0);
    }

    #[actix_web::test]
    async fn second_run_skips_everything_sent_by_the_first() {
        let test = setup();
        insert_invoice(&test, "INV-1", 10, Some("+447700900123"), &[10]).await;
        insert_invoice(&test, "INV-2", 16, Some("+447700900124"), &[16, 2]).await;
        insert_invoice(&test, "INV-3", 31, Some("+447700900125"), &[31, 24, 17]).await;

        let first = run(&test).await.unwrap();
        assert_eq!(first.sent, 3);

        let second = run(&test).await.unwrap();
        assert_eq!(second.processed, 3);
        assert_eq!(second.sent, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(test.sms.sent_messages().len(), 3);
    }

    #[actix_web::test]
    async fn claimed_stage_is_not_sent_twice() {
        let test = setup();
        let invoice = insert_invoice(&test, "INV-1", 10, Some("+447700900123"), &[10]).await;
        // A concurrent run has claimed stage 1 and not recorded its reminder yet
        assert!(test
            .ctx
            .repos
            .invoices
            .claim_reminder_stage(&invoice.id, 1, NOW)
            .await
            .unwrap());

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(test.sms.sent_messages().is_empty());
    }

    #[actix_web::test]
    async fn unrecorded_followup_does_not_stall_later_stages() {
        let mut test = setup();
        let invoice = insert_invoice(&test, "INV-1", 10, Some("+447700900123"), &[10]).await;
        test.ctx.repos.payment_reminders = Arc::new(FailingReminderRepo {
            inner: test.ctx.repos.payment_reminders.clone(),
            failures: Mutex::new(1),
        });

        let first = run(&test).await.unwrap();
        assert_eq!(first.sent, 0);
        assert_eq!(
            first.errors,
            vec!["Invoice INV-1: follow-up SMS was sent but could not be recorded".to_string()]
        );

        // The claim stays leased so the unrecorded stage is not resent right away
        test.ctx.sys = Arc::new(StaticTimeSys(NOW + DAY_MILLIS / 2));
        let retry = run(&test).await.unwrap();
        assert_eq!(retry.skipped, 1);
        assert!(retry.errors.is_empty());
        assert_eq!(test.sms.sent_messages().len(), 1);

        let mut sent_per_run = vec![];
        for days in &[2, 10, 30, 60] {
            test.ctx.sys = Arc::new(StaticTimeSys(NOW + days * DAY_MILLIS));
            let summary = run(&test).await.unwrap();
            assert!(summary.errors.is_empty());
            sent_per_run.push(summary.sent);
        }
        assert_eq!(sent_per_run, vec![1, 1, 1, 0]);
        assert_eq!(test.sms.sent_messages().len(), 4);

        let reminders = test
            .ctx
            .repos
            .payment_reminders
            .find_by_invoice(&invoice.id)
            .await
            .unwrap();
        assert_eq!(reminders.len(), 4);
        let invoice = test.ctx.repos.invoices.find(&invoice.id).await.unwrap();
        assert_eq!(invoice.reminder_stage_claimed, 3);
        assert_eq!(invoice.status, InvoiceStatus::Overdue);
    }

    #[actix_web::test]
    async fn marks_invoice_overdue_when_previous_reminder_is_old() {
        let test = setup();
        let stale = insert_invoice(&test, "INV-1", 16, Some("+447700900123"), &[16]).await;
        let recent = insert_invoice(&test, "INV-2", 16, Some("+447700900124"), &[16, 2]).await;

        let summary = run(&test).await.unwrap();
        assert_eq!(summary.sent, 2);

        let stale = test.ctx.repos.invoices.find(&stale.id).await.unwrap();
        assert_eq!(stale.status, InvoiceStatus::Overdue);
        let recent = test.ctx.repos.invoices.find(&recent.id).await.unwrap();
        assert_eq!(recent.status, InvoiceStatus::Sent);
    }

    #[actix_web::test]
    async fn ignores_invoices_not_awaiting_payment() {
        let test = setup();
        let paid = insert_invoice(&test, "INV-1", 10, Some("+447700900123"), &[10]).await;
        test.ctx
            .repos
            .invoices
            .update_status(&paid.id, InvoiceStatus::Paid, NOW)
            .await
            .unwrap();

        let summary = run(&test).await.unwrap();
        assert_eq!(summary, FollowupRunSummary::default());
    }

    #[actix_web::test]
    async fn requires_sms_provider() {
        let mut test = setup();
        test.ctx.services.sms = None;
        insert_invoice(&test, "INV-1", 10, Some("+447700900123"), &[10]).await;

        assert!(matches!(
            run(&test).await,
            Err(UseCaseError::SmsProviderNotConfigured)
        ));
    }
}

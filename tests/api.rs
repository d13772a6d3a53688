mod helpers;

use helpers::setup::spawn_app;
use helpers::utils::{create_invoice, days_ago};
use clinic_sdk::{
    APIErrorVariant, ChannelOutcome, InvoiceStatus, NotificationChannel, Profile, ReminderKind,
    SendInvoiceInput,
};
use serde_json::json;

#[actix_web::test]
async fn test_status_ok() {
    let app = spawn_app().await;
    assert!(app.anonymous_sdk().status.check_health().await.is_ok());
}

#[actix_web::test]
async fn test_requires_bearer_token() {
    let app = spawn_app().await;
    let res = app.anonymous_sdk().user.me().await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::Unauthorized);

    let sdk = clinic_sdk::ClinicSDK::new(app.address.clone(), "not-a-token");
    let res = sdk.user.me().await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::Unauthorized);
}

#[actix_web::test]
async fn test_me_merges_profile() {
    let app = spawn_app().await;
    let (user_id, sdk) = app.user_sdk();

    let me = sdk.user.me().await.expect("Expected to get me");
    assert_eq!(me.id, user_id);
    assert_eq!(me.email.as_deref(), Some("owner@clinic.example"));
    assert_eq!(me.profile, Profile::default());

    let me = sdk
        .user
        .update_profile(Profile {
            clinic_name: Some("Riverside Physio".into()),
            bank_name: Some("Monzo".into()),
            bank_account_number: Some("12345678".into()),
            bank_sort_code: Some("04-00-04".into()),
            ..Default::default()
        })
        .await
        .expect("Expected to update profile");
    assert_eq!(me.profile.clinic_name.as_deref(), Some("Riverside Physio"));

    let me = sdk
        .user
        .update_profile(Profile {
            bank_name: Some("".into()),
            ..Default::default()
        })
        .await
        .expect("Expected to update profile");
    assert_eq!(me.profile.clinic_name.as_deref(), Some("Riverside Physio"));
    assert_eq!(me.profile.bank_name, None);
}

#[actix_web::test]
async fn test_invoice_is_owner_only() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    let (_, other_sdk) = app.user_sdk();

    let invoice = create_invoice(&sdk, "INV-1", Some("+447700900123"), days_ago(0)).await;
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.amount, 6500);
    assert!(sdk.invoice.get(&invoice.id).await.is_ok());

    let res = other_sdk.invoice.get(&invoice.id).await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::NotFound);
    let res = other_sdk.invoice.mark_paid(&invoice.id).await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::NotFound);
}

#[actix_web::test]
async fn test_send_invoice_records_initial_reminder() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    let invoice = create_invoice(&sdk, "INV-2", Some("+447700900123"), days_ago(0)).await;

    let res = sdk
        .invoice
        .send(SendInvoiceInput {
            invoice_id: invoice.id.clone(),
            channels: None,
        })
        .await
        .expect("Expected to send invoice");
    assert_eq!(res.invoice.status, InvoiceStatus::Sent);
    assert_eq!(res.sms, ChannelOutcome::Sent { id: "SM1".into() });
    assert!(matches!(res.email, ChannelOutcome::NotApplicable { .. }));
    assert_eq!(app.sms.sent_messages()[0].to, "+447700900123");

    let reminders = sdk
        .invoice
        .get_reminders(&invoice.id)
        .await
        .expect("Expected to get reminders")
        .reminders;
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].kind, ReminderKind::Initial);
}

#[actix_web::test]
async fn test_send_invoice_over_requested_channel_only() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    let invoice = create_invoice(&sdk, "INV-3", Some("sam@example.com"), days_ago(0)).await;

    let res = sdk
        .invoice
        .send(SendInvoiceInput {
            invoice_id: invoice.id.clone(),
            channels: Some(vec![NotificationChannel::Sms]),
        })
        .await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::BadClientData);

    let res = sdk
        .invoice
        .send(SendInvoiceInput {
            invoice_id: invoice.id.clone(),
            channels: Some(vec![NotificationChannel::Email]),
        })
        .await
        .expect("Expected to email invoice");
    assert!(matches!(res.email, ChannelOutcome::Sent { .. }));
    assert_eq!(app.email.sent_messages().len(), 1);
    assert!(app.sms.sent_messages().is_empty());
}

#[actix_web::test]
async fn test_send_invoice_reports_provider_failure() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    app.sms.fail_for("+447700900999");
    let invoice = create_invoice(&sdk, "INV-4", Some("+447700900999"), days_ago(0)).await;

    let res = sdk
        .invoice
        .send(SendInvoiceInput {
            invoice_id: invoice.id.clone(),
            channels: None,
        })
        .await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::BadGateway);
    let invoice = sdk.invoice.get(&invoice.id).await.unwrap().invoice;
    assert_eq!(invoice.status, InvoiceStatus::Draft);
}

#[actix_web::test]
async fn test_mark_invoice_paid() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    let invoice = create_invoice(&sdk, "INV-5", None, days_ago(3)).await;

    let invoice = sdk
        .invoice
        .mark_paid(&invoice.id)
        .await
        .expect("Expected to mark invoice paid")
        .invoice;
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    let res = sdk
        .invoice
        .send(SendInvoiceInput {
            invoice_id: invoice.id.clone(),
            channels: None,
        })
        .await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::BadClientData);
}

#[actix_web::test]
async fn test_ask_consultant() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();

    let res = sdk
        .consultant
        .ask(
            "How do I reduce missed appointments?".into(),
            Some(json!({ "missedAppointments": 12 })),
        )
        .await
        .expect("Expected an answer");
    assert_eq!(res.answer, "Consider a cancellation fee.");
    assert!(app.chat.requests()[0].user.contains("\"missedAppointments\": 12"));

    let res = sdk.consultant.ask(" ".into(), None).await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::BadClientData);
}

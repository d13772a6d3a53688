mod helpers;

use clinic_domain::sign_stripe_payload;
use clinic_infra::StripeSubscription;
use clinic_sdk::{APIErrorVariant, CreateCheckoutSessionInput};
use helpers::setup::{spawn_app, TestApp};
use serde_json::json;

fn checkout_input() -> CreateCheckoutSessionInput {
    CreateCheckoutSessionInput {
        price_id: "price_pro".into(),
        success_url: None,
        cancel_url: None,
    }
}

fn signed_payload(app: &TestApp, event: serde_json::Value) -> (Vec<u8>, String) {
    let payload = serde_json::to_vec(&event).unwrap();
    let secret = &app.ctx.config.stripe.as_ref().unwrap().webhook_secret;
    let signature =
        sign_stripe_payload(&payload, secret, chrono::Utc::now().timestamp()).unwrap();
    (payload, signature)
}

fn active_subscription(customer: &str) -> StripeSubscription {
    StripeSubscription {
        id: "sub_1".into(),
        customer: customer.into(),
        status: "active".into(),
        current_period_start: Some(1_710_000_000),
        current_period_end: Some(1_712_592_000),
        cancel_at_period_end: false,
        items: Default::default(),
        metadata: Default::default(),
    }
}

#[actix_web::test]
async fn test_checkout_and_sync() {
    let app = spawn_app().await;
    let (user_id, sdk) = app.user_sdk();

    let res = sdk.billing.get_subscription().await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::NotFound);

    let session = sdk
        .billing
        .create_checkout_session(checkout_input())
        .await
        .expect("Expected to create checkout session");
    assert!(session.url.is_some());
    let customer = app.billing.customers()[0].clone();
    assert_eq!(app.billing.checkout_requests()[0].user_id, user_id.to_string());

    // Not completed yet
    let res = sdk.billing.sync_checkout_session(session.session_id.clone()).await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::Conflict);

    app.billing.insert_subscription(active_subscription(&customer.id));
    app.billing.complete_session(&session.session_id, "sub_1");

    let subscription = sdk
        .billing
        .sync_checkout_session(session.session_id.clone())
        .await
        .expect("Expected to sync session")
        .subscription;
    assert!(subscription.active);
    assert_eq!(subscription.stripe_customer_id, customer.id);

    let stored = sdk.billing.get_subscription().await.unwrap().subscription;
    assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_1"));
}

#[actix_web::test]
async fn test_sync_rejects_session_of_other_user() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    let (_, other_sdk) = app.user_sdk();

    let session = sdk
        .billing
        .create_checkout_session(checkout_input())
        .await
        .unwrap();
    let customer = app.billing.customers()[0].clone();
    app.billing.insert_subscription(active_subscription(&customer.id));
    app.billing.complete_session(&session.session_id, "sub_1");

    let res = other_sdk
        .billing
        .sync_checkout_session(session.session_id.clone())
        .await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::Forbidden);
    assert!(app
        .ctx
        .repos
        .subscriptions
        .find_by_customer(&customer.id)
        .await
        .is_none());
}

#[actix_web::test]
async fn test_webhook_updates_subscription() {
    let app = spawn_app().await;
    let (_, sdk) = app.user_sdk();
    sdk.billing
        .create_checkout_session(checkout_input())
        .await
        .unwrap();
    let customer = app.billing.customers()[0].clone();

    let (payload, signature) = signed_payload(
        &app,
        json!({
            "id": "evt_1",
            "type": "customer.subscription.updated",
            "data": { "object": {
                "id": "sub_1",
                "customer": customer.id,
                "status": "past_due",
                "cancel_at_period_end": true
            } }
        }),
    );
    let res = app
        .anonymous_sdk()
        .billing
        .send_webhook(payload, &signature)
        .await
        .expect("Expected webhook to be accepted");
    assert!(res.received);

    let subscription = sdk.billing.get_subscription().await.unwrap().subscription;
    assert_eq!(subscription.status, "past_due");
    assert!(!subscription.active);
    assert!(subscription.cancel_at_period_end);
}

#[actix_web::test]
async fn test_webhook_rejects_invalid_signature() {
    let app = spawn_app().await;
    let (payload, signature) = signed_payload(
        &app,
        json!({ "id": "evt_1", "type": "invoice.paid", "data": { "object": {} } }),
    );

    let sdk = app.anonymous_sdk();
    let mut tampered = payload.clone();
    tampered.push(b'\n');
    let res = sdk.billing.send_webhook(tampered, &signature).await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::BadClientData);

    let res = sdk.billing.send_webhook(payload.clone(), "t=1,v1=00").await;
    assert_eq!(res.unwrap_err().variant, APIErrorVariant::BadClientData);

    // Unhandled event types are acknowledged
    let res = sdk.billing.send_webhook(payload, &signature).await;
    assert!(res.unwrap().received);
}

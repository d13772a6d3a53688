mod create_checkout_session;
mod get_subscription;
mod stripe_webhook;
mod sync_checkout_session;

use actix_web::web;
use clinic_domain::{Subscription, ID};
use clinic_infra::{ClinicContext, StripeSubscription};
use create_checkout_session::create_checkout_session_controller;
use get_subscription::get_subscription_controller;
use stripe_webhook::stripe_webhook_controller;
use sync_checkout_session::sync_checkout_session_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/billing/checkout",
        web::post().to(create_checkout_session_controller),
    );
    cfg.route("/billing/webhook", web::post().to(stripe_webhook_controller));
    cfg.route(
        "/billing/sync",
        web::post().to(sync_checkout_session_controller),
    );
    cfg.route(
        "/billing/subscription",
        web::get().to(get_subscription_controller),
    );
}

/// Stores the provider subscription as the local copy of the user
async fn store_subscription(
    user_id: ID,
    stripe_subscription: &StripeSubscription,
    ctx: &ClinicContext,
) -> anyhow::Result<Subscription> {
    let (current_period_start, current_period_end) = stripe_subscription.period();
    let subscription = Subscription {
        user_id,
        stripe_customer_id: stripe_subscription.customer.clone(),
        stripe_subscription_id: Some(stripe_subscription.id.clone()),
        status: stripe_subscription.status.clone(),
        plan: stripe_subscription.price_id().map(String::from),
        current_period_start,
        current_period_end,
        cancel_at_period_end: stripe_subscription.cancel_at_period_end,
        updated: ctx.sys.get_timestamp_millis(),
    };
    ctx.repos.subscriptions.upsert(&subscription).await?;
    Ok(subscription)
}

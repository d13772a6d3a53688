use super::ISubscriptionRepo;
use clinic_domain::{Subscription, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresSubscriptionRepo {
    pool: PgPool,
}

impl PostgresSubscriptionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriptionRaw {
    user_uid: Uuid,
    stripe_customer_id: String,
    stripe_subscription_id: Option<String>,
    status: String,
    plan: Option<String>,
    current_period_start: Option<i64>,
    current_period_end: Option<i64>,
    cancel_at_period_end: bool,
    updated: i64,
}

impl From<SubscriptionRaw> for Subscription {
    fn from(e: SubscriptionRaw) -> Self {
        Self {
            user_id: e.user_uid.into(),
            stripe_customer_id: e.stripe_customer_id,
            stripe_subscription_id: e.stripe_subscription_id,
            status: e.status,
            plan: e.plan,
            current_period_start: e.current_period_start,
            current_period_end: e.current_period_end,
            cancel_at_period_end: e.cancel_at_period_end,
            updated: e.updated,
        }
    }
}

const SUBSCRIPTION_COLUMNS: &str = "user_uid, stripe_customer_id, stripe_subscription_id, status, plan, current_period_start, current_period_end, cancel_at_period_end, updated";

#[async_trait::async_trait]
impl ISubscriptionRepo for PostgresSubscriptionRepo {
    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions(user_uid, stripe_customer_id, stripe_subscription_id, status, plan, current_period_start, current_period_end, cancel_at_period_end, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (stripe_customer_id) DO UPDATE SET
            user_uid = EXCLUDED.user_uid,
            stripe_subscription_id = EXCLUDED.stripe_subscription_id,
            status = EXCLUDED.status,
            plan = EXCLUDED.plan,
            current_period_start = EXCLUDED.current_period_start,
            current_period_end = EXCLUDED.current_period_end,
            cancel_at_period_end = EXCLUDED.cancel_at_period_end,
            updated = EXCLUDED.updated
            "#,
        )
        .bind(subscription.user_id.inner_ref())
        .bind(&subscription.stripe_customer_id)
        .bind(&subscription.stripe_subscription_id)
        .bind(&subscription.status)
        .bind(&subscription.plan)
        .bind(subscription.current_period_start)
        .bind(subscription.current_period_end)
        .bind(subscription.cancel_at_period_end)
        .bind(subscription.updated)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to upsert subscription: {:?}. DB returned error: {:?}",
                subscription, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Option<Subscription> {
        let res: Option<SubscriptionRaw> = sqlx::query_as::<_, SubscriptionRaw>(&format!(
            "SELECT {} FROM subscriptions WHERE user_uid = $1 ORDER BY updated DESC LIMIT 1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find subscription of user: {:?} failed. DB returned error: {:?}",
                user_id, e
            );
            e
        })
        .ok()?;
        res.map(|sub| sub.into())
    }

    async fn find_by_customer(&self, stripe_customer_id: &str) -> Option<Subscription> {
        let res: Option<SubscriptionRaw> = sqlx::query_as::<_, SubscriptionRaw>(&format!(
            "SELECT {} FROM subscriptions WHERE stripe_customer_id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(stripe_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find subscription of customer: {} failed. DB returned error: {:?}",
                stripe_customer_id, e
            );
            e
        })
        .ok()?;
        res.map(|sub| sub.into())
    }
}

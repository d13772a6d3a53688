use super::IBillingCustomerRepo;
use clinic_domain::{BillingCustomer, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresBillingCustomerRepo {
    pool: PgPool,
}

impl PostgresBillingCustomerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BillingCustomerRaw {
    user_uid: Uuid,
    stripe_customer_id: String,
    created: i64,
}

impl From<BillingCustomerRaw> for BillingCustomer {
    fn from(e: BillingCustomerRaw) -> Self {
        Self {
            user_id: e.user_uid.into(),
            stripe_customer_id: e.stripe_customer_id,
            created: e.created,
        }
    }
}

#[async_trait::async_trait]
impl IBillingCustomerRepo for PostgresBillingCustomerRepo {
    async fn insert(&self, customer: &BillingCustomer) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO billing_customers(user_uid, stripe_customer_id, created)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(customer.user_id.inner_ref())
        .bind(&customer.stripe_customer_id)
        .bind(customer.created)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to insert billing customer: {:?}. DB returned error: {:?}",
                customer, e
            );
            e
        })?;
        Ok(())
    }

    async fn find_by_user(&self, user_id: &ID) -> Option<BillingCustomer> {
        let res: Option<BillingCustomerRaw> = sqlx::query_as::<_, BillingCustomerRaw>(
            "SELECT user_uid, stripe_customer_id, created FROM billing_customers WHERE user_uid = $1",
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find billing customer of user: {:?} failed. DB returned error: {:?}",
                user_id, e
            );
            e
        })
        .ok()?;
        res.map(|customer| customer.into())
    }

    async fn find_by_customer_id(&self, stripe_customer_id: &str) -> Option<BillingCustomer> {
        let res: Option<BillingCustomerRaw> = sqlx::query_as::<_, BillingCustomerRaw>(
            "SELECT user_uid, stripe_customer_id, created FROM billing_customers WHERE stripe_customer_id = $1",
        )
        .bind(stripe_customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find billing customer: {} failed. DB returned error: {:?}",
                stripe_customer_id, e
            );
            e
        })
        .ok()?;
        res.map(|customer| customer.into())
    }
}

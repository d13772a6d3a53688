use super::IProfileRepo;
use clinic_domain::{Profile, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresProfileRepo {
    pool: PgPool,
}

impl PostgresProfileRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRaw {
    user_uid: Uuid,
    full_name: Option<String>,
    clinic_name: Option<String>,
    bank_name: Option<String>,
    bank_account_number: Option<String>,
    bank_sort_code: Option<String>,
    phone: Option<String>,
}

impl From<ProfileRaw> for Profile {
    fn from(e: ProfileRaw) -> Self {
        Self {
            user_id: e.user_uid.into(),
            full_name: e.full_name,
            clinic_name: e.clinic_name,
            bank_name: e.bank_name,
            bank_account_number: e.bank_account_number,
            bank_sort_code: e.bank_sort_code,
            phone: e.phone,
        }
    }
}

#[async_trait::async_trait]
impl IProfileRepo for PostgresProfileRepo {
    async fn find(&self, user_id: &ID) -> Option<Profile> {
        let res: Option<ProfileRaw> = sqlx::query_as::<_, ProfileRaw>(
            r#"
            SELECT user_uid, full_name, clinic_name, bank_name, bank_account_number, bank_sort_code, phone
            FROM profiles
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Find profile of user: {:?} failed. DB returned error: {:?}",
                user_id, e
            );
            e
        })
        .ok()?;
        res.map(|profile| profile.into())
    }

    async fn upsert(&self, profile: &Profile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles(user_uid, full_name, clinic_name, bank_name, bank_account_number, bank_sort_code, phone)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_uid) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            clinic_name = EXCLUDED.clinic_name,
            bank_name = EXCLUDED.bank_name,
            bank_account_number = EXCLUDED.bank_account_number,
            bank_sort_code = EXCLUDED.bank_sort_code,
            phone = EXCLUDED.phone
            "#,
        )
        .bind(profile.user_id.inner_ref())
        .bind(&profile.full_name)
        .bind(&profile.clinic_name)
        .bind(&profile.bank_name)
        .bind(&profile.bank_account_number)
        .bind(&profile.bank_sort_code)
        .bind(&profile.phone)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!(
                "Unable to upsert profile: {:?}. DB returned error: {:?}",
                profile, e
            );
            e
        })?;
        Ok(())
    }
}

mod inmemory;
mod postgres;

pub use inmemory::InMemoryProfileRepo;
pub use postgres::PostgresProfileRepo;

use clinic_domain::{Profile, ID};

#[async_trait::async_trait]
pub trait IProfileRepo: Send + Sync {
    async fn find(&self, user_id: &ID) -> Option<Profile>;
    async fn upsert(&self, profile: &Profile) -> anyhow::Result<()>;
}

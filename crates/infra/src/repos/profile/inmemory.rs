use super::IProfileRepo;
use crate::repos::shared::inmemory_repo::*;
use clinic_domain::{Profile, ID};

pub struct InMemoryProfileRepo {
    profiles: std::sync::Mutex<Vec<Profile>>,
}

impl InMemoryProfileRepo {
    pub fn new() -> Self {
        Self {
            profiles: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IProfileRepo for InMemoryProfileRepo {
    async fn find(&self, user_id: &ID) -> Option<Profile> {
        find(user_id, &self.profiles)
    }

    async fn upsert(&self, profile: &Profile) -> anyhow::Result<()> {
        upsert_by(profile, &self.profiles, |p| p.user_id == profile.user_id);
        Ok(())
    }
}

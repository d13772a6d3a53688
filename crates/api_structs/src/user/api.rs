use crate::dtos::ProfileDTO;
use clinic_domain::{Profile, ID};
use serde::{Deserialize, Serialize};

/// Identity of the authenticated user merged with the stored profile
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: ID,
    pub email: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileDTO,
}

impl MeResponse {
    pub fn new(id: ID, email: Option<String>, profile: Option<Profile>) -> Self {
        Self {
            id,
            email,
            profile: profile.map(ProfileDTO::new).unwrap_or_default(),
        }
    }
}

pub mod get_me {
    use super::*;

    pub type APIResponse = MeResponse;
}

pub mod update_profile {
    use super::*;

    /// Only the given fields are changed, an empty string clears a field
    pub type RequestBody = ProfileDTO;

    pub type APIResponse = MeResponse;
}

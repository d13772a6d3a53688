use crate::{APIResponse, BaseClient};
use clinic_api_structs::*;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct UserClient {
    base: Arc<BaseClient>,
}

impl UserClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn me(&self) -> APIResponse<get_me::APIResponse> {
        self.base.get("me".into(), StatusCode::OK).await
    }

    /// Only the fields that are set are changed, an empty string clears a field
    pub async fn update_profile(
        &self,
        profile: update_profile::RequestBody,
    ) -> APIResponse<update_profile::APIResponse> {
        self.base
            .put(profile, "me/profile".into(), StatusCode::OK)
            .await
    }
}

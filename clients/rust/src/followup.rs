use crate::{APIResponse, BaseClient};
use clinic_api_structs::check_and_send_followups;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct FollowupClient {
    base: Arc<BaseClient>,
}

impl FollowupClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Runs the follow-up scheduler, authorized by the trigger key
    pub async fn run(&self, trigger_key: &str) -> APIResponse<check_and_send_followups::APIResponse> {
        self.base
            .post_raw(
                Vec::new(),
                &[(crate::FOLLOWUP_KEY_HEADER, trigger_key)],
                "followups/run".into(),
                StatusCode::OK,
            )
            .await
    }
}

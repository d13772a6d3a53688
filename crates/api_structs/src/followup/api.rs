use clinic_domain::FollowupRunSummary;
use serde::{Deserialize, Serialize};

pub mod check_and_send_followups {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub processed: usize,
        pub sent: usize,
        pub skipped: usize,
        pub errors: Vec<String>,
    }

    impl APIResponse {
        pub fn new(summary: FollowupRunSummary) -> Self {
            Self {
                processed: summary.processed,
                sent: summary.sent,
                skipped: summary.skipped,
                errors: summary.errors,
            }
        }
    }
}

use crate::{APIResponse, BaseClient};
use clinic_api_structs::ask_consultant;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct ConsultantClient {
    base: Arc<BaseClient>,
}

impl ConsultantClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn ask(
        &self,
        question: String,
        context: Option<Value>,
    ) -> APIResponse<ask_consultant::APIResponse> {
        let body = ask_consultant::RequestBody { question, context };
        self.base
            .post(body, "consultant".into(), StatusCode::OK)
            .await
    }
}

use serde::{Deserialize, Serialize};

pub mod ask_consultant {
    use super::*;
    use serde_json::Value;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub question: String,
        /// Clinic data the question is about
        #[serde(default)]
        pub context: Option<Value>,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub answer: String,
    }
}

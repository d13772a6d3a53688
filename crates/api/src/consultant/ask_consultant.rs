use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::ask_consultant::{APIResponse, RequestBody};
use clinic_domain::{consultant_user_prompt, CONSULTANT_SYSTEM_PROMPT};
use clinic_infra::{ChatRequest, ClinicContext, ProviderError};
use serde_json::Value;

pub async fn ask_consultant_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = AskConsultantUseCase {
        question: body.question,
        context: body.context,
    };

    execute(usecase, &ctx)
        .await
        .map(|answer| HttpResponse::Ok().json(APIResponse { answer }))
        .map_err(ClinicError::from)
}

/// Forwards a business question about the clinic to the chat model
#[derive(Debug)]
pub struct AskConsultantUseCase {
    pub question: String,
    pub context: Option<Value>,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyQuestion,
    ChatNotConfigured,
    Provider(ProviderError),
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyQuestion => Self::BadClientData("A question is required".into()),
            UseCaseError::ChatNotConfigured => {
                Self::ServiceUnavailable("The consultant is not configured".into())
            }
            UseCaseError::Provider(e) => {
                Self::BadGateway(format!("The consultant could not answer: {}", e))
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for AskConsultantUseCase {
    type Response = String;

    type Error = UseCaseError;

    const NAME: &'static str = "AskConsultant";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        if self.question.trim().is_empty() {
            return Err(UseCaseError::EmptyQuestion);
        }
        let chat = ctx
            .services
            .chat
            .as_ref()
            .ok_or(UseCaseError::ChatNotConfigured)?;

        let request = ChatRequest {
            system: CONSULTANT_SYSTEM_PROMPT.to_string(),
            user: consultant_user_prompt(&self.question, self.context.as_ref()),
        };
        chat.complete(&request).await.map_err(UseCaseError::Provider)
    }
}

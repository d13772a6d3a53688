use super::store_subscription;
use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::sync_checkout_session::{APIResponse, RequestBody};
use clinic_domain::{Subscription, ID};
use clinic_infra::{ClinicContext, ProviderError};

pub async fn sync_checkout_session_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = SyncCheckoutSessionUseCase {
        user_id: user.id,
        session_id: body.0.session_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(ClinicError::from)
}

/// Pulls the subscription of a finished checkout directly from the billing
/// provider, for when the webhook has not arrived yet
#[derive(Debug)]
pub struct SyncCheckoutSessionUseCase {
    pub user_id: ID,
    pub session_id: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptySessionId,
    BillingNotConfigured,
    SessionOfOtherUser,
    NoSubscription(String),
    Provider(ProviderError),
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptySessionId => Self::BadClientData("A session id is required".into()),
            UseCaseError::BillingNotConfigured => {
                Self::ServiceUnavailable("Billing is not configured".into())
            }
            UseCaseError::SessionOfOtherUser => {
                Self::Forbidden("The checkout session belongs to another user".into())
            }
            UseCaseError::NoSubscription(session_id) => Self::Conflict(format!(
                "The checkout session: {}, has no subscription yet",
                session_id
            )),
            UseCaseError::Provider(e) => Self::BadGateway(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SyncCheckoutSessionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "SyncCheckoutSession";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let session_id = self.session_id.trim();
        if session_id.is_empty() {
            return Err(UseCaseError::EmptySessionId);
        }
        let billing = ctx
            .services
            .billing
            .as_ref()
            .ok_or(UseCaseError::BillingNotConfigured)?;

        let session = billing
            .retrieve_checkout_session(session_id)
            .await
            .map_err(UseCaseError::Provider)?;
        if session.user_reference() != Some(self.user_id.to_string().as_str()) {
            return Err(UseCaseError::SessionOfOtherUser);
        }

        let subscription = match session.subscription {
            Some(subscription) => subscription,
            None => return Err(UseCaseError::NoSubscription(session.id)),
        };
        let subscription = match subscription.into_object() {
            Some(subscription) => subscription,
            None => return Err(UseCaseError::NoSubscription(session.id)),
        };

        store_subscription(self.user_id.clone(), &subscription, ctx)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}

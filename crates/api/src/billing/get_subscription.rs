use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::get_subscription::APIResponse;
use clinic_domain::{Subscription, ID};
use clinic_infra::ClinicContext;

pub async fn get_subscription_controller(
    http_req: HttpRequest,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = GetSubscriptionUseCase { user_id: user.id };

    execute(usecase, &ctx)
        .await
        .map(|subscription| HttpResponse::Ok().json(APIResponse::new(subscription)))
        .map_err(ClinicError::from)
}

#[derive(Debug)]
struct GetSubscriptionUseCase {
    pub user_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound => {
                Self::NotFound("No subscription was found for the user.".into())
            }
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetSubscriptionUseCase {
    type Response = Subscription;

    type Error = UseCaseError;

    const NAME: &'static str = "GetSubscription";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        ctx.repos
            .subscriptions
            .find_by_user(&self.user_id)
            .await
            .ok_or(UseCaseError::NotFound)
    }
}

use crate::error::ClinicError;
use crate::shared::{
    auth::{protect_route, AuthUser},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::get_me::APIResponse;
use clinic_domain::Profile;
use clinic_infra::ClinicContext;

pub async fn get_me_controller(
    http_req: HttpRequest,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = GetMeUseCase { user };

    execute(usecase, &ctx)
        .await
        .map(|(user, profile)| HttpResponse::Ok().json(APIResponse::new(user.id, user.email, profile)))
        .map_err(ClinicError::from)
}

#[derive(Debug)]
struct GetMeUseCase {
    pub user: AuthUser,
}

#[derive(Debug)]
enum UseCaseError {}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetMeUseCase {
    type Response = (AuthUser, Option<Profile>);

    type Error = UseCaseError;

    const NAME: &'static str = "GetMe";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let profile = ctx.repos.profiles.find(&self.user.id).await;
        Ok((self.user.clone(), profile))
    }
}

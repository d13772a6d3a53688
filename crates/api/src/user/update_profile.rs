use crate::error::ClinicError;
use crate::shared::{
    auth::{protect_route, AuthUser},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::update_profile::{APIResponse, RequestBody};
use clinic_domain::Profile;
use clinic_infra::ClinicContext;

pub async fn update_profile_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = UpdateProfileUseCase {
        user: user.clone(),
        changes: body.0,
    };

    execute(usecase, &ctx)
        .await
        .map(|profile| {
            HttpResponse::Ok().json(APIResponse::new(user.id, user.email, Some(profile)))
        })
        .map_err(ClinicError::from)
}

#[derive(Debug)]
pub struct UpdateProfileUseCase {
    pub user: AuthUser,
    pub changes: RequestBody,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

/// A given value replaces the field, a blank value clears it
fn apply(field: &mut Option<String>, change: &Option<String>) {
    if let Some(value) = change {
        let value = value.trim();
        *field = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for UpdateProfileUseCase {
    type Response = Profile;

    type Error = UseCaseError;

    const NAME: &'static str = "UpdateProfile";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let mut profile = ctx
            .repos
            .profiles
            .find(&self.user.id)
            .await
            .unwrap_or_else(|| Profile::new(self.user.id.clone()));

        let changes = &self.changes;
        apply(&mut profile.full_name, &changes.full_name);
        apply(&mut profile.clinic_name, &changes.clinic_name);
        apply(&mut profile.bank_name, &changes.bank_name);
        apply(&mut profile.bank_account_number, &changes.bank_account_number);
        apply(&mut profile.bank_sort_code, &changes.bank_sort_code);
        apply(&mut profile.phone, &changes.phone);

        ctx.repos
            .profiles
            .upsert(&profile)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        Ok(profile)
    }
}

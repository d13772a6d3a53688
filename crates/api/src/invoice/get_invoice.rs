use super::find_user_invoice;
use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::get_invoice::{APIResponse, PathParams};
use clinic_domain::{Invoice, ID};
use clinic_infra::ClinicContext;

pub async fn get_invoice_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = GetInvoiceUseCase {
        user_id: user.id,
        invoice_id: path.invoice_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|invoice| HttpResponse::Ok().json(APIResponse::new(invoice)))
        .map_err(ClinicError::from)
}

#[derive(Debug)]
struct GetInvoiceUseCase {
    pub user_id: ID,
    pub invoice_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(invoice_id) => Self::NotFound(format!(
                "The invoice with id: {}, was not found.",
                invoice_id
            )),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetInvoiceUseCase {
    type Response = Invoice;

    type Error = UseCaseError;

    const NAME: &'static str = "GetInvoice";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        find_user_invoice(&self.user_id, &self.invoice_id, ctx)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.invoice_id.clone()))
    }
}

use super::find_user_invoice;
use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::mark_invoice_paid::{APIResponse, PathParams};
use clinic_domain::{Invoice, InvoiceStatus, ID};
use clinic_infra::ClinicContext;

pub async fn mark_invoice_paid_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = MarkInvoicePaidUseCase {
        user_id: user.id,
        invoice_id: path.invoice_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|invoice| HttpResponse::Ok().json(APIResponse::new(invoice)))
        .map_err(ClinicError::from)
}

/// A paid invoice receives no more follow-ups
#[derive(Debug)]
struct MarkInvoicePaidUseCase {
    pub user_id: ID,
    pub invoice_id: ID,
}

#[derive(Debug, PartialEq)]
enum UseCaseError {
    NotFound(ID),
    Canceled,
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(invoice_id) => Self::NotFound(format!(
                "The invoice with id: {}, was not found.",
                invoice_id
            )),
            UseCaseError::Canceled => {
                Self::Conflict("A canceled invoice can not be marked as paid".into())
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for MarkInvoicePaidUseCase {
    type Response = Invoice;

    type Error = UseCaseError;

    const NAME: &'static str = "MarkInvoicePaid";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let mut invoice = find_user_invoice(&self.user_id, &self.invoice_id, ctx)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.invoice_id.clone()))?;

        match invoice.status {
            InvoiceStatus::Paid => return Ok(invoice),
            InvoiceStatus::Canceled => return Err(UseCaseError::Canceled),
            _ => (),
        }

        invoice.status = InvoiceStatus::Paid;
        invoice.updated = ctx.sys.get_timestamp_millis();
        ctx.repos
            .invoices
            .update_status(&invoice.id, invoice.status, invoice.updated)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        Ok(invoice)
    }
}

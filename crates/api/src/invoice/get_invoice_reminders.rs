use super::find_user_invoice;
use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::get_invoice_reminders::{APIResponse, PathParams};
use clinic_domain::{PaymentReminder, ID};
use clinic_infra::ClinicContext;

pub async fn get_invoice_reminders_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let usecase = GetInvoiceRemindersUseCase {
        user_id: user.id,
        invoice_id: path.invoice_id.clone(),
    };

    execute(usecase, &ctx)
        .await
        .map(|reminders| HttpResponse::Ok().json(APIResponse::new(reminders)))
        .map_err(ClinicError::from)
}

/// Reminder history of an invoice, newest first
#[derive(Debug)]
struct GetInvoiceRemindersUseCase {
    pub user_id: ID,
    pub invoice_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(invoice_id) => Self::NotFound(format!(
                "The invoice with id: {}, was not found.",
                invoice_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetInvoiceRemindersUseCase {
    type Response = Vec<PaymentReminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetInvoiceReminders";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let invoice = find_user_invoice(&self.user_id, &self.invoice_id, ctx)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.invoice_id.clone()))?;

        ctx.repos
            .payment_reminders
            .find_by_invoice(&invoice.id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}

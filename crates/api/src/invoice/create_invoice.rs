use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use clinic_api_structs::create_invoice::{APIResponse, RequestBody};
use clinic_domain::{Invoice, InvoiceStatus, ID};
use clinic_infra::ClinicContext;

pub async fn create_invoice_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = CreateInvoiceUseCase {
        user_id: user.id,
        invoice_number: body.invoice_number,
        patient_name: body.patient_name,
        patient_contact: body.patient_contact,
        amount: body.amount,
        issue_date: body.issue_date,
        status: body.status.unwrap_or(InvoiceStatus::Draft),
    };

    execute(usecase, &ctx)
        .await
        .map(|invoice| HttpResponse::Created().json(APIResponse::new(invoice)))
        .map_err(ClinicError::from)
}

#[derive(Debug)]
pub struct CreateInvoiceUseCase {
    pub user_id: ID,
    pub invoice_number: String,
    pub patient_name: Option<String>,
    pub patient_contact: Option<String>,
    pub amount: i64,
    pub issue_date: NaiveDate,
    pub status: InvoiceStatus,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyInvoiceNumber,
    NegativeAmount(i64),
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyInvoiceNumber => {
                Self::BadClientData("The invoice number can not be empty".into())
            }
            UseCaseError::NegativeAmount(amount) => Self::BadClientData(format!(
                "The amount: {} can not be negative",
                amount
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

fn non_blank(val: Option<String>) -> Option<String> {
    val.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateInvoiceUseCase {
    type Response = Invoice;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateInvoice";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let invoice_number = self.invoice_number.trim();
        if invoice_number.is_empty() {
            return Err(UseCaseError::EmptyInvoiceNumber);
        }
        if self.amount < 0 {
            return Err(UseCaseError::NegativeAmount(self.amount));
        }

        let mut invoice = Invoice::new(
            self.user_id.clone(),
            invoice_number.to_string(),
            self.amount,
            self.issue_date,
            ctx.sys.get_timestamp_millis(),
        );
        invoice.patient_name = non_blank(self.patient_name.take());
        invoice.patient_contact = non_blank(self.patient_contact.take());
        invoice.status = self.status;

        ctx.repos
            .invoices
            .insert(&invoice)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        Ok(invoice)
    }
}

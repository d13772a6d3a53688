use crate::error::ClinicError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use clinic_api_structs::create_checkout_session::{APIResponse, RequestBody};
use clinic_domain::{BillingCustomer, ID};
use clinic_infra::{ClinicContext, CreateCheckoutSession, IBillingProvider, ProviderError};
use std::sync::Arc;
use url::Url;

pub async fn create_checkout_session_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<ClinicContext>,
) -> Result<HttpResponse, ClinicError> {
    let user = protect_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = CreateCheckoutSessionUseCase {
        user_id: user.id,
        email: user.email,
        price_id: body.price_id,
        success_url: body.success_url,
        cancel_url: body.cancel_url,
    };

    execute(usecase, &ctx)
        .await
        .map(|session| {
            HttpResponse::Ok().json(APIResponse {
                session_id: session.id,
                url: session.url,
            })
        })
        .map_err(ClinicError::from)
}

#[derive(Debug)]
pub struct CreateCheckoutSessionUseCase {
    pub user_id: ID,
    pub email: Option<String>,
    pub price_id: String,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug)]
pub enum UseCaseError {
    EmptyPriceId,
    InvalidRedirectUrl(String),
    BillingNotConfigured,
    Provider(ProviderError),
    StorageError,
}

impl From<UseCaseError> for ClinicError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyPriceId => Self::BadClientData("A price id is required".into()),
            UseCaseError::InvalidRedirectUrl(url) => {
                Self::BadClientData(format!("The redirect url: {}, is not a valid url", url))
            }
            UseCaseError::BillingNotConfigured => {
                Self::ServiceUnavailable("Billing is not configured".into())
            }
            UseCaseError::Provider(e) => Self::BadGateway(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

fn redirect_url(given: &Option<String>, default: String) -> Result<String, UseCaseError> {
    match given {
        Some(url) => Url::parse(url)
            .map(|_| url.clone())
            .map_err(|_| UseCaseError::InvalidRedirectUrl(url.clone())),
        None => Ok(default),
    }
}

impl CreateCheckoutSessionUseCase {
    async fn get_or_create_customer(
        &self,
        billing: &Arc<dyn IBillingProvider>,
        ctx: &ClinicContext,
    ) -> Result<String, UseCaseError> {
        if let Some(customer) = ctx.repos.billing_customers.find_by_user(&self.user_id).await {
            return Ok(customer.stripe_customer_id);
        }

        let stripe_customer = billing
            .create_customer(self.email.as_deref(), &self.user_id.to_string())
            .await
            .map_err(UseCaseError::Provider)?;
        let customer = BillingCustomer {
            user_id: self.user_id.clone(),
            stripe_customer_id: stripe_customer.id,
            created: ctx.sys.get_timestamp_millis(),
        };
        ctx.repos
            .billing_customers
            .insert(&customer)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        Ok(customer.stripe_customer_id)
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateCheckoutSessionUseCase {
    type Response = UseCaseResponse;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateCheckoutSession";

    async fn execute(&mut self, ctx: &ClinicContext) -> Result<Self::Response, Self::Error> {
        let price_id = self.price_id.trim();
        if price_id.is_empty() {
            return Err(UseCaseError::EmptyPriceId);
        }
        let app_url = &ctx.config.app_url;
        let success_url = redirect_url(
            &self.success_url,
            format!(
                "{}/billing/success?session_id={{CHECKOUT_SESSION_ID}}",
                app_url
            ),
        )?;
        let cancel_url = redirect_url(&self.cancel_url, format!("{}/billing/cancel", app_url))?;
        let billing = ctx
            .services
            .billing
            .clone()
            .ok_or(UseCaseError::BillingNotConfigured)?;

        let customer_id = self.get_or_create_customer(&billing, ctx).await?;

        let params = CreateCheckoutSession {
            customer_id,
            price_id: price_id.to_string(),
            user_id: self.user_id.to_string(),
            success_url,
            cancel_url,
        };
        let session = billing
            .create_checkout_session(&params)
            .await
            .map_err(UseCaseError::Provider)?;

        Ok(UseCaseResponse {
            id: session.id,
            url: session.url,
        })
    }
}

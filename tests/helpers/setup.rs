use clinic_api::{Application, Claims};
use clinic_infra::{
    ClinicContext, InMemoryBillingProvider, InMemoryChatProvider, InMemoryEmailProvider,
    InMemorySmsProvider,
};
use clinic_sdk::{ClinicSDK, ID};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

pub struct TestApp {
    pub ctx: ClinicContext,
    pub address: String,
    pub sms: Arc<InMemorySmsProvider>,
    pub email: Arc<InMemoryEmailProvider>,
    pub billing: Arc<InMemoryBillingProvider>,
    pub chat: Arc<InMemoryChatProvider>,
}

impl TestApp {
    /// SDK acting as a new clinic user
    pub fn user_sdk(&self) -> (ID, ClinicSDK) {
        let user_id = ID::new();
        let sdk = self.sdk_for(&user_id, Some("owner@clinic.example"));
        (user_id, sdk)
    }

    pub fn sdk_for(&self, user_id: &ID, email: Option<&str>) -> ClinicSDK {
        let token = create_token(&self.ctx.config.auth_jwt_secret, user_id, email);
        ClinicSDK::new(self.address.clone(), token)
    }

    pub fn anonymous_sdk(&self) -> ClinicSDK {
        ClinicSDK::new(self.address.clone(), "")
    }
}

pub fn create_token(secret: &str, user_id: &ID, email: Option<&str>) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(String::from),
        exp: (chrono::Utc::now().timestamp() + 60 * 60) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Expected to create token")
}

// Launch the application as a background task
pub async fn spawn_app() -> TestApp {
    let mut ctx = ClinicContext::create_inmemory();
    ctx.config.port = 0; // Random port

    let sms = Arc::new(InMemorySmsProvider::new());
    let email = Arc::new(InMemoryEmailProvider::new());
    let billing = Arc::new(InMemoryBillingProvider::new());
    let chat = Arc::new(InMemoryChatProvider::new("Consider a cancellation fee."));
    ctx.services.sms = Some(sms.clone());
    ctx.services.email = Some(email.clone());
    ctx.services.billing = Some(billing.clone());
    ctx.services.chat = Some(chat.clone());

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        ctx,
        address,
        sms,
        email,
        billing,
        chat,
    }
}

mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, ConfigError, OpenAIConfig, ResendConfig, StripeConfig, TwilioConfig};
pub use repos::{
    IBillingCustomerRepo, IInvoiceRepo, IPaymentReminderRepo, IProfileRepo, ISubscriptionRepo,
    Repos,
};
pub use services::*;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys};

#[derive(Clone)]
pub struct ClinicContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub services: Services,
}

struct ContextParams {
    pub postgres_connection_string: String,
    pub config: Config,
}

impl ClinicContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        let services = Services::from_config(&params.config);
        Ok(Self {
            repos,
            config: params.config,
            sys: Arc::new(RealSys {}),
            services,
        })
    }

    /// Context with inmemory repositories and no configured providers
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::inmemory(),
            sys: Arc::new(RealSys {}),
            services: Default::default(),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<ClinicContext> {
    let config = Config::from_env()?;
    ClinicContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
        config,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .map_err(|_| anyhow::anyhow!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string()?)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}

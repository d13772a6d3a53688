use clinic_domain::FollowupPolicy;
use clinic_utils::create_random_secret;
use thiserror::Error;
use tracing::warn;

const DEFAULT_PORT: u16 = 5000;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("The {0} environment variable must be set")]
    Missing(&'static str),
    #[error("The {name} environment variable is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("Incomplete {group} configuration: {missing} must be set as well")]
    IncompleteGroup {
        group: &'static str,
        missing: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number of outgoing SMS
    pub from_number: String,
}

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub from_address: String,
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    /// Secret used to verify webhook signatures
    pub webhook_secret: String,
}

#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: u16,
    /// HS256 secret used to verify the access tokens of clinic users
    pub auth_jwt_secret: String,
    /// Key the external trigger of the follow-up scheduler has to present
    pub followup_trigger_key: String,
    pub followups: FollowupPolicy,
    /// Base url of the web client, used for checkout redirects
    pub app_url: String,
    pub twilio: Option<TwilioConfig>,
    pub resend: Option<ResendConfig>,
    pub stripe: Option<StripeConfig>,
    pub openai: Option<OpenAIConfig>,
}

fn parse_port(value: Option<String>) -> u16 {
    match value {
        None => DEFAULT_PORT,
        Some(port) => match port.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, DEFAULT_PORT
                );
                DEFAULT_PORT
            }
        },
    }
}

fn parse_offset_days(value: Option<String>) -> Result<Vec<i64>, ConfigError> {
    let value = match value {
        Some(value) => value,
        None => return Ok(FollowupPolicy::default().offset_days),
    };
    let invalid = |reason: String| ConfigError::Invalid {
        name: "FOLLOWUP_OFFSET_DAYS",
        reason,
    };

    let mut offsets: Vec<i64> = Vec::new();
    for part in value.split(',') {
        let offset = part
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("`{}` is not a number of days", part.trim())))?;
        if offset < 0 {
            return Err(invalid(format!("offset {} is negative", offset)));
        }
        if let Some(previous) = offsets.last() {
            if offset <= *previous {
                return Err(invalid("offsets must be strictly increasing".into()));
            }
        }
        offsets.push(offset);
    }
    Ok(offsets)
}

fn parse_max_followups(value: Option<String>) -> Result<usize, ConfigError> {
    match value {
        None => Ok(FollowupPolicy::default().max_followups),
        Some(value) => match value.trim().parse::<usize>() {
            Ok(max) if max >= 1 => Ok(max),
            _ => Err(ConfigError::Invalid {
                name: "FOLLOWUP_MAX_COUNT",
                reason: format!("`{}` is not a positive number", value),
            }),
        },
    }
}

impl Config {
    /// Reads and validates the configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads and validates the configuration through the given variable lookup.
    /// Blank values are treated as not set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth_jwt_secret = var("AUTH_JWT_SECRET").ok_or(ConfigError::Missing("AUTH_JWT_SECRET"))?;

        let followup_trigger_key = match var("FOLLOWUP_TRIGGER_KEY") {
            Some(key) => key,
            None => {
                let key = create_random_secret(32);
                warn!(
                    "FOLLOWUP_TRIGGER_KEY is not set. Generated an ephemeral key for this process only: {}",
                    key
                );
                key
            }
        };

        let followups = FollowupPolicy {
            offset_days: parse_offset_days(var("FOLLOWUP_OFFSET_DAYS"))?,
            max_followups: parse_max_followups(var("FOLLOWUP_MAX_COUNT"))?,
            ..Default::default()
        };

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_PHONE_NUMBER"),
        ) {
            (None, None, None) => None,
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioConfig {
                account_sid,
                auth_token,
                from_number,
            }),
            (sid, token, _) => {
                let missing = if sid.is_none() {
                    "TWILIO_ACCOUNT_SID"
                } else if token.is_none() {
                    "TWILIO_AUTH_TOKEN"
                } else {
                    "TWILIO_PHONE_NUMBER"
                };
                return Err(ConfigError::IncompleteGroup {
                    group: "Twilio",
                    missing,
                });
            }
        };

        let resend = var("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            from_address: var("EMAIL_FROM").unwrap_or_else(|| "invoices@resend.dev".into()),
        });

        let stripe = match (var("STRIPE_SECRET_KEY"), var("STRIPE_WEBHOOK_SECRET")) {
            (None, None) => None,
            (Some(secret_key), Some(webhook_secret)) => Some(StripeConfig {
                secret_key,
                webhook_secret,
            }),
            (Some(_), None) => {
                return Err(ConfigError::IncompleteGroup {
                    group: "Stripe",
                    missing: "STRIPE_WEBHOOK_SECRET",
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteGroup {
                    group: "Stripe",
                    missing: "STRIPE_SECRET_KEY",
                })
            }
        };

        let openai = var("OPENAI_API_KEY").map(|api_key| OpenAIConfig {
            api_key,
            model: var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".into()),
        });

        let app_url = var("APP_URL")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port: parse_port(var("PORT")),
            auth_jwt_secret,
            followup_trigger_key,
            followups,
            app_url,
            twilio,
            resend,
            stripe,
            openai,
        })
    }

    /// Configuration of the in-memory context. Providers are faked there,
    /// only the secrets the server itself verifies are set.
    pub fn inmemory() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_jwt_secret: "inmemory-auth-secret".into(),
            followup_trigger_key: "inmemory-followup-key".into(),
            followups: FollowupPolicy::default(),
            app_url: "http://localhost:3000".into(),
            twilio: None,
            resend: None,
            stripe: Some(StripeConfig {
                secret_key: "sk_test_inmemory".into(),
                webhook_secret: "whsec_inmemory".into(),
            }),
            openai: None,
        }
    }
}

use crate::error::ClinicError;
use actix_web::HttpRequest;
use clinic_domain::ID;
use clinic_infra::ClinicContext;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

pub const FOLLOWUP_KEY_HEADER: &str = "x-followup-key";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the clinic user
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (as UTC timestamp in seconds)
    pub exp: usize,
}

/// The clinic user a request is made by
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: ID,
    pub email: Option<String>,
}

fn parse_authtoken_header(token_header_value: &str) -> &str {
    let value = token_header_value.trim();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

fn decode_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?
    .claims;
    Ok(claims)
}

/// Authenticates the bearer token of the request
pub fn protect_route(req: &HttpRequest, ctx: &ClinicContext) -> Result<AuthUser, ClinicError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|token| token.to_str().ok())
        .map(parse_authtoken_header)
        .ok_or_else(|| ClinicError::Unauthorized("Missing bearer token".into()))?;

    let claims = decode_token(&ctx.config.auth_jwt_secret, token)
        .map_err(|_| ClinicError::Unauthorized("Invalid or expired token".into()))?;
    let id = claims
        .sub
        .parse::<ID>()
        .map_err(|_| ClinicError::Unauthorized("Token subject is not a valid user id".into()))?;

    Ok(AuthUser {
        id,
        email: claims.email,
    })
}

/// Only the external trigger knowing the follow-up key may run the scheduler
pub fn protect_followup_route(req: &HttpRequest, ctx: &ClinicContext) -> Result<(), ClinicError> {
    let key = req
        .headers()
        .get(FOLLOWUP_KEY_HEADER)
        .and_then(|key| key.to_str().ok());
    match key {
        Some(key) if followup_key_matches(key, &ctx.config.followup_trigger_key) => Ok(()),
        _ => Err(ClinicError::Unauthorized(format!(
            "Missing or invalid `{}` header",
            FOLLOWUP_KEY_HEADER
        ))),
    }
}

fn followup_key_matches(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, exp: usize) -> String {
        let claims = Claims {
            sub: sub.into(),
            email: Some("jo@clinic.example".into()),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    const FAR_FUTURE: usize = 4_102_444_800;

    #[test]
    fn authenticates_valid_token() {
        let ctx = ClinicContext::create_inmemory();
        let user_id = ID::new();
        let req = TestRequest::default()
            .insert_header((
                "authorization",
                format!(
                    "Bearer {}",
                    token(&ctx.config.auth_jwt_secret, &user_id.as_string(), FAR_FUTURE)
                ),
            ))
            .to_http_request();

        let user = protect_route(&req, &ctx).unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.email.as_deref(), Some("jo@clinic.example"));
    }

    #[test]
    fn rejects_invalid_tokens() {
        let ctx = ClinicContext::create_inmemory();
        let user_id = ID::new().as_string();
        let bad_tokens = vec![
            token("other-secret", &user_id, FAR_FUTURE),
            token(&ctx.config.auth_jwt_secret, &user_id, 1000),
            token(&ctx.config.auth_jwt_secret, "not-a-uuid", FAR_FUTURE),
            "garbage".to_string(),
        ];
        for t in bad_tokens {
            let req = TestRequest::default()
                .insert_header(("authorization", format!("Bearer {}", t)))
                .to_http_request();
            assert!(matches!(
                protect_route(&req, &ctx),
                Err(ClinicError::Unauthorized(_))
            ));
        }

        let req = TestRequest::default().to_http_request();
        assert!(protect_route(&req, &ctx).is_err());
    }

    #[test]
    fn followup_route_requires_key() {
        let ctx = ClinicContext::create_inmemory();
        let req = TestRequest::default()
            .insert_header((FOLLOWUP_KEY_HEADER, ctx.config.followup_trigger_key.clone()))
            .to_http_request();
        assert!(protect_followup_route(&req, &ctx).is_ok());

        let req = TestRequest::default()
            .insert_header((FOLLOWUP_KEY_HEADER, "wrong"))
            .to_http_request();
        assert!(protect_followup_route(&req, &ctx).is_err());
        let req = TestRequest::default().to_http_request();
        assert!(protect_followup_route(&req, &ctx).is_err());
    }

    #[test]
    fn followup_key_must_match_exactly() {
        let expected = "s3cr3t-trigger-key";
        assert!(followup_key_matches("s3cr3t-trigger-key", expected));
        assert!(!followup_key_matches("s3cr3t-trigger-kez", expected));
        assert!(!followup_key_matches("s3cr3t-trigger", expected));
        assert!(!followup_key_matches("s3cr3t-trigger-key2", expected));
        assert!(!followup_key_matches("", expected));
    }
}

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age in seconds of a signed billing webhook
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Error, Debug, PartialEq)]
pub enum SignatureError {
    #[error("Signature header is malformed")]
    MalformedHeader,
    #[error("Signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,
    #[error("No signature matches the payload")]
    NoMatchingSignature,
    #[error("Webhook secret can not be used as a signing key")]
    InvalidSecret,
}

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

/// Parses `t=<unix secs>,v1=<hex>[,v1=<hex>...]`, other schemes are ignored
fn parse_header(header: &str) -> Result<SignatureHeader<'_>, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let mut key_value = part.trim().splitn(2, '=');
        match (key_value.next(), key_value.next()) {
            (Some("t"), Some(ts)) => {
                timestamp = Some(ts.parse::<i64>().map_err(|_| SignatureError::MalformedHeader)?)
            }
            (Some("v1"), Some(sig)) => signatures.push(sig),
            _ => continue,
        }
    }
    match timestamp {
        Some(timestamp) if !signatures.is_empty() => Ok(SignatureHeader {
            timestamp,
            signatures,
        }),
        _ => Err(SignatureError::MalformedHeader),
    }
}

fn mac_for(secret: &str, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Verifies the signature header the billing provider attaches to webhook calls.
///
/// The signed content is `<timestamp>.<raw body>` with HMAC-SHA256 and the
/// webhook secret. `now_secs` is the current unix time in seconds.
pub fn verify_stripe_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), SignatureError> {
    let header = parse_header(header)?;
    if (now_secs - header.timestamp).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(SignatureError::TimestampOutOfTolerance);
    }

    let mac = mac_for(secret, header.timestamp, payload)?;
    let matches = header.signatures.iter().any(|sig| match hex::decode(sig) {
        Ok(sig) => mac.clone().verify_slice(&sig).is_ok(),
        Err(_) => false,
    });
    if matches {
        Ok(())
    } else {
        Err(SignatureError::NoMatchingSignature)
    }
}

/// Produces a signature header for the payload, the counterpart of
/// `verify_stripe_signature`
pub fn sign_stripe_payload(
    payload: &[u8],
    secret: &str,
    timestamp: i64,
) -> Result<String, SignatureError> {
    let signature = mac_for(secret, timestamp, payload)?.finalize().into_bytes();
    Ok(format!("t={},v1={}", timestamp, hex::encode(signature)))
}

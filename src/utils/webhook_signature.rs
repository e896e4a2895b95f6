//! Verification of the `Stripe-Signature` header on webhook deliveries.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=...][,v0=...]`. The
//! signed payload is `"<t>.<raw body>"`, keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Oldest delivery accepted, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

/// Allowed clock skew for timestamps ahead of ours.
const MAX_FUTURE_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,
    #[error("signature header has no timestamp")]
    MissingTimestamp,
    #[error("signature header has no v1 signature")]
    MissingSignature,
    #[error("timestamp outside the tolerance window")]
    StaleTimestamp,
    #[error("no signatures found matching the expected signature for payload")]
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<Vec<u8>>,
}

fn parse_header(header: &str) -> Result<SignatureHeader, SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or(SignatureError::Malformed)?;
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::Malformed)?);
            }
            "v1" => {
                // Entries that are not hex can never match; skip them.
                if let Ok(sig) = hex::decode(value) {
                    signatures.push(sig);
                }
            }
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Builds a header value for `payload`, as the provider would send it.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={},v1={}", timestamp, hex::encode(compute(secret, timestamp, payload)))
}

/// Verifies `header` against the raw request body at time `now` (unix seconds).
pub fn verify(secret: &str, payload: &[u8], header: &str, now: i64) -> Result<(), SignatureError> {
    let parsed = parse_header(header)?;

    let age = now
        .checked_sub(parsed.timestamp)
        .ok_or(SignatureError::StaleTimestamp)?;
    if age > TOLERANCE_SECS || age < -MAX_FUTURE_SKEW_SECS {
        return Err(SignatureError::StaleTimestamp);
    }

    let expected = compute(secret, parsed.timestamp, payload);
    let matched = parsed
        .signatures
        .iter()
        .any(|candidate| bool::from(expected.as_slice().ct_eq(candidate.as_slice())));
    if matched {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

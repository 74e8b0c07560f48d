//! Webhook signature verification
//!
//! Stripe signs each delivery with HMAC-SHA256 over `"{t}.{body}"` and sends
//! the result in a header of the form `t=<unix>,v1=<hex>[,v1=<hex>...]`.

use std::time::Duration;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};
use thiserror::Error;

use crate::events::{RawEvent, VerifiedEvent};

type HmacSha256 = Hmac<Sha256>;

/// Signature scheme this verifier accepts
const SCHEME: &str = "v1";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Missing signature header")]
    MissingHeader,
    #[error("Malformed signature header: {0}")]
    MalformedHeader(String),
    #[error("No signature matches the expected signature for the payload")]
    NoMatchingSignature,
    #[error("Timestamp {timestamp} outside tolerance of {tolerance:?} (now {now})")]
    TimestampOutsideTolerance {
        timestamp: i64,
        now: i64,
        tolerance: Duration,
    },
    #[error("Malformed event body: {0}")]
    MalformedBody(String),
}

/// Components of a signature header
#[derive(Debug, PartialEq, Eq)]
struct SignatureHeader<'a> {
    timestamp: i64,
    /// Hex strings of every `v1` entry, decoded only when compared
    signatures: Vec<&'a str>,
}

impl<'a> SignatureHeader<'a> {
    fn parse(header: &'a str) -> Result<Self, VerificationError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            // Empty and bare items are skipped
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };

            match key {
                "t" => {
                    let t = value.parse::<i64>().map_err(|_| {
                        VerificationError::MalformedHeader(format!("invalid timestamp {:?}", value))
                    })?;
                    timestamp = Some(t);
                }
                SCHEME => signatures.push(value),
                // v0 and future schemes
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| VerificationError::MalformedHeader("missing timestamp".to_string()))?;
        if signatures.is_empty() {
            return Err(VerificationError::MalformedHeader(format!(
                "no {} signature",
                SCHEME
            )));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Verify a webhook delivery and parse its event.
///
/// `body` must be the exact bytes received, `header` the value of the
/// signature header if one was sent. A zero `tolerance` skips the freshness
/// check.
pub fn verify(
    body: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance: Duration,
) -> Result<VerifiedEvent, VerificationError> {
    verify_at(body, header, secret, tolerance, chrono::Utc::now().timestamp())
}

/// Same as [`verify`] with the current Unix time supplied by the caller
pub fn verify_at(
    body: &[u8],
    header: Option<&str>,
    secret: &str,
    tolerance: Duration,
    now: i64,
) -> Result<VerifiedEvent, VerificationError> {
    let header = header.ok_or(VerificationError::MissingHeader)?;
    let header = SignatureHeader::parse(header)?;

    let expected = compute_signature(secret, header.timestamp, body)
        .ok_or(VerificationError::NoMatchingSignature)?;

    let matched = header
        .signatures
        .iter()
        .filter_map(|s| hex::decode(s).ok())
        .fold(Choice::from(0), |acc, candidate| {
            acc | expected.as_slice().ct_eq(candidate.as_slice())
        });
    if !bool::from(matched) {
        return Err(VerificationError::NoMatchingSignature);
    }

    let distance_ms = u128::from(now.abs_diff(header.timestamp)) * 1000;
    if !tolerance.is_zero() && distance_ms > tolerance.as_millis() {
        return Err(VerificationError::TimestampOutsideTolerance {
            timestamp: header.timestamp,
            now,
            tolerance,
        });
    }

    let raw: RawEvent = serde_json::from_slice(body)
        .map_err(|e| VerificationError::MalformedBody(e.to_string()))?;
    if !raw.data.is_object() {
        return Err(VerificationError::MalformedBody(
            "data is not an object".to_string(),
        ));
    }

    Ok(VerifiedEvent::from_raw(raw))
}

/// Build a signature header for `body` the way Stripe does.
///
/// Used by tests and local tooling to produce deliveries that verify.
pub fn sign(body: &[u8], secret: &str, timestamp: i64) -> String {
    let signature = compute_signature(secret, timestamp, body)
        .map(hex::encode)
        .unwrap_or_default();
    format!("t={},{}={}", timestamp, SCHEME, signature)
}

fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);
    Some(mac.finalize().into_bytes().to_vec())
}

//! Token encoding, signing, and validation
//!
//! Bearer tokens bind an extension identity, a client fingerprint, and an
//! issuance timestamp. The wire format is
//! `base64(json(payload)) + "." + signature[..32]` where the signature is
//! the hex SHA-256 of the encoded payload concatenated with the fingerprint.
//!
//! The signature carries no server-held secret: it is an integrity check
//! keyed by the fingerprint convention, not an authentication MAC.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use crate::models::TokenPayload;

/// Maximum token age in hours
pub const TOKEN_EXPIRY_HOURS: i64 = 24;

/// Number of signature hex characters carried in the token
const SIGNATURE_LEN: usize = 32;

/// Length of the random nonce in bytes
const NONCE_BYTES: usize = 16;

/// Validate a bearer token against the caller-claimed identity and fingerprint
///
/// The expected identity and fingerprint come from transport headers, not
/// from the token itself. Checks, in order:
/// - the token splits into exactly two dot-separated parts
/// - part one base64-decodes to a well-formed JSON payload
/// - the payload identity equals `expected_id`
/// - the token is no older than `max_age` (second granularity)
/// - when `expected_fingerprint` is non-empty, it equals the payload fingerprint
/// - the trailing signature matches the first 32 hex characters of
///   `sha256(part1 + expected_fingerprint)`
///
/// Pure function of its inputs plus `now`; no side effects.
pub fn validate_token_format(
    token: &str,
    expected_id: &str,
    expected_fingerprint: &str,
    now: DateTime<Utc>,
    max_age: Duration,
) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return false;
    }

    let payload_bytes = match STANDARD.decode(parts[0]) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let payload: TokenPayload = match serde_json::from_slice(&payload_bytes) {
        Ok(payload) => payload,
        Err(_) => return false,
    };

    if payload.extension_id != expected_id {
        return false;
    }

    if now.timestamp() - payload.timestamp > max_age.num_seconds() {
        return false;
    }

    if !expected_fingerprint.is_empty() && payload.fingerprint != expected_fingerprint {
        return false;
    }

    let expected_sig = generate_token_signature(parts[0], expected_fingerprint);
    parts[1] == &expected_sig[..SIGNATURE_LEN]
}

/// Compute the hex SHA-256 signature over an encoded payload and fingerprint
///
/// Deterministic: the same inputs always produce the same signature.
pub fn generate_token_signature(encoded_payload: &str, fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(encoded_payload.as_bytes());
    hasher.update(fingerprint.as_bytes());
    hex::encode(hasher.finalize())
}

/// Mint a well-formed token for an identity and fingerprint, issued at `now`
///
/// The nonce is random per call; everything else is deterministic. Used by
/// client tooling and the test suites.
pub fn mint_token(extension_id: &str, fingerprint: &str, now: DateTime<Utc>) -> String {
    let payload = TokenPayload {
        extension_id: extension_id.to_string(),
        fingerprint: fingerprint.to_string(),
        timestamp: now.timestamp(),
        nonce: generate_nonce(),
    };

    // Serializing a plain struct cannot fail
    let json = serde_json::to_vec(&payload).expect("token payload serialization");
    let encoded = STANDARD.encode(json);
    let signature = generate_token_signature(&encoded, fingerprint);

    format!("{}.{}", encoded, &signature[..SIGNATURE_LEN])
}

/// Generate a random hex nonce using OsRng
fn generate_nonce() -> String {
    use rand::RngCore;

    let mut bytes = [0u8; NONCE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

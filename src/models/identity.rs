//! Extension identity and token wire formats
//!
//! Field names on the wire are fixed by the extension client and must not
//! change: the identity travels in the registration body, the token payload
//! inside the bearer token itself.

use serde::{Deserialize, Serialize};

/// Immutable description of a calling extension client
///
/// Supplied by the caller at registration time. `extension_id` is the
/// registry key; nothing beyond that string is enforced to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionIdentity {
    /// Unique identity string, caller-supplied
    #[serde(rename = "extensionId")]
    pub extension_id: String,

    /// Semantic version of the installed extension
    #[serde(rename = "extensionVersion")]
    pub extension_version: String,

    /// Install timestamp, seconds since epoch
    #[serde(rename = "installTime")]
    pub install_time: i64,

    /// Client-derived fingerprint from browser/runtime signals
    pub fingerprint: String,

    /// Browser user-agent string, informational
    #[serde(rename = "userAgent")]
    pub user_agent: String,

    /// Client timezone, informational
    pub timezone: String,
}

/// Payload embedded in a bearer token
///
/// Serialized as JSON, base64-encoded, and concatenated with a truncated
/// signature: `base64(json(payload)) + "." + signature[..32]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Extension identity the token is bound to
    #[serde(rename = "ext")]
    pub extension_id: String,

    /// Fingerprint the token was minted with
    #[serde(rename = "fp")]
    pub fingerprint: String,

    /// Issuance timestamp, seconds since epoch
    #[serde(rename = "ts")]
    pub timestamp: i64,

    /// Anti-replay hint; generated but not checked for reuse
    pub nonce: String,
}

/// Body of a registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Identity the caller wants to register
    pub identity: ExtensionIdentity,

    /// Client-side timestamp, seconds since epoch
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity() -> ExtensionIdentity {
        ExtensionIdentity {
            extension_id: "test-extension-id-12345".to_string(),
            extension_version: "1.0.0".to_string(),
            install_time: 1_700_000_000,
            fingerprint: "abcdef1234567890".to_string(),
            user_agent: "Mozilla/5.0 Chrome/xxx Safari/xxx".to_string(),
            timezone: "America/New_York".to_string(),
        }
    }

    // Test 1: Identity serializes with wire field names
    #[test]
    fn test_identity_wire_field_names() {
        let json = serde_json::to_value(test_identity()).unwrap();
        assert_eq!(json["extensionId"], "test-extension-id-12345");
        assert_eq!(json["extensionVersion"], "1.0.0");
        assert_eq!(json["installTime"], 1_700_000_000i64);
        assert_eq!(json["userAgent"], "Mozilla/5.0 Chrome/xxx Safari/xxx");
    }

    // Test 2: Token payload uses short wire field names
    #[test]
    fn test_token_payload_wire_field_names() {
        let payload = TokenPayload {
            extension_id: "ext-A".to_string(),
            fingerprint: "fp1".to_string(),
            timestamp: 1_700_000_000,
            nonce: "n-1".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["ext"], "ext-A");
        assert_eq!(json["fp"], "fp1");
        assert_eq!(json["ts"], 1_700_000_000i64);
        assert_eq!(json["nonce"], "n-1");
    }

    // Test 3: Token payload round-trips through JSON
    #[test]
    fn test_token_payload_roundtrip() {
        let payload = TokenPayload {
            extension_id: "ext-A".to_string(),
            fingerprint: "fp1".to_string(),
            timestamp: 1_700_000_000,
            nonce: "n-1".to_string(),
        };

        let json = serde_json::to_string(&payload).unwrap();
        let decoded: TokenPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, payload);
    }

    // Test 4: RegisterRequest deserializes from client JSON
    #[test]
    fn test_register_request_from_json() {
        let json = serde_json::json!({
            "identity": {
                "extensionId": "ext-A",
                "extensionVersion": "2.1.0",
                "installTime": 1_700_000_000i64,
                "fingerprint": "fp1",
                "userAgent": "ua",
                "timezone": "UTC",
            },
            "timestamp": 1_700_000_100i64,
        });

        let req: RegisterRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.identity.extension_id, "ext-A");
        assert_eq!(req.timestamp, 1_700_000_100);
    }
}

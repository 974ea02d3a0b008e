//! HMAC-SHA256 signing for automation callbacks.
//!
//! The automation platform signs each callback body with a shared secret
//! and sends the hex digest in the `x-signature` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the callback signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Compute the hex-encoded HMAC-SHA256 of `payload` under `secret`.
pub fn compute_callback_hmac(secret: &str, payload: &[u8]) -> String {
    let mut mac = keyed(secret);
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a hex signature against `payload` in constant time.
///
/// An optional `sha256=` prefix is accepted. Malformed hex fails.
pub fn verify_callback_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let signature = signature.trim();
    let signature = signature.strip_prefix("sha256=").unwrap_or(signature);
    let Some(expected) = hex::decode(signature) else {
        return false;
    };
    let mut mac = keyed(secret);
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

fn keyed(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length")
}

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` on odd length or non-hex characters.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| s.get(i..i + 2).and_then(|pair| u8::from_str_radix(pair, 16).ok()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hmac_produces_hex_string() {
        let sig = compute_callback_hmac("secret", br#"{"status":"completed"}"#);
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_round_trip() {
        let body = br#"{"status":"completed"}"#;
        let sig = compute_callback_hmac("secret", body);
        assert!(verify_callback_signature("secret", body, &sig));
        assert!(verify_callback_signature("secret", body, &format!("sha256={sig}")));
        assert!(verify_callback_signature("secret", body, &sig.to_uppercase()));
    }

    #[test]
    fn wrong_secret_or_body_fails() {
        let sig = compute_callback_hmac("secret", b"payload");
        assert!(!verify_callback_signature("other", b"payload", &sig));
        assert!(!verify_callback_signature("secret", b"payload2", &sig));
    }

    #[test]
    fn malformed_signature_fails() {
        assert!(!verify_callback_signature("secret", b"payload", "zz"));
        assert!(!verify_callback_signature("secret", b"payload", "abc"));
        assert!(!verify_callback_signature("secret", b"payload", ""));
    }
}

//! Webhook body authentication (hex HMAC-SHA256 over the raw body).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "linear-signature";

fn mac(secret: &SecretString) -> Option<HmacSha256> {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes()).ok()
}

/// Hex-encoded signature of `body` under `secret`.
pub fn sign(secret: &SecretString, body: &[u8]) -> String {
    match mac(secret) {
        Some(mut mac) => {
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
        None => String::new(),
    }
}

/// Constant-time check of `signature` against `body`. A missing or
/// non-hex signature fails.
pub fn verify_signature(secret: &SecretString, body: &[u8], signature: Option<&str>) -> bool {
    let Some(expected) = signature.and_then(|s| hex::decode(s.trim()).ok()) else {
        return false;
    };
    let Some(mut mac) = mac(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

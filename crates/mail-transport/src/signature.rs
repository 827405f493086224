//! Webhook signature verification.
//!
//! Mailgun signs every webhook with `HMAC-SHA256(signing_key, timestamp ||
//! token)` and sends the hex digest alongside the timestamp and token.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum distance in seconds between the signed timestamp and now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Computes the hex encoded signature for `timestamp` and `token`.
#[must_use]
pub fn sign(signing_key: &str, timestamp: i64, token: &str) -> String {
    hex::encode(new_mac(signing_key, timestamp, token).finalize().into_bytes())
}

/// Verifies a webhook signature block.
///
/// Returns `false` when the signature is not valid hex, does not match, or
/// the timestamp is further than `tolerance_secs` away from `now`.
#[must_use]
pub fn verify(
    signing_key: &str,
    timestamp: i64,
    token: &str,
    signature: &str,
    now: i64,
    tolerance_secs: i64,
) -> bool {
    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        tracing::debug!(timestamp, now, "Webhook signature timestamp is stale");
        return false;
    }

    let Ok(expected) = hex::decode(signature) else {
        return false;
    };

    new_mac(signing_key, timestamp, token).verify_slice(&expected).is_ok()
}

fn new_mac(signing_key: &str, timestamp: i64, token: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .expect("HMAC accepts keys of any length; qed");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(token.as_bytes());
    mac
}

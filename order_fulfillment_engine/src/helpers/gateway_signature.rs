//! Payment-gateway signature checks.
//!
//! The gateway signs its confirmation callbacks with an HMAC-SHA256 over `"{gateway_order_id}|{payment_id}"`, keyed
//! with the merchant's shared secret and hex encoded. An inbound confirmation is authentic iff recomputing the
//! digest reproduces the supplied signature exactly.
//!
//! A mismatch is a normal negative outcome, not an error: these functions return `bool` and never fail. A missing
//! secret means verification fails closed.

use hmac::{Hmac, Mac};
use log::warn;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Recompute the gateway signature for the given correlation ids.
pub fn calculate_signature(gateway_order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a caller-supplied signature against the recomputed one. An empty secret always rejects.
pub fn verify_signature(gateway_order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    if secret.is_empty() {
        warn!("🔐️ No gateway secret is configured. Rejecting the payment confirmation.");
        return false;
    }
    calculate_signature(gateway_order_id, payment_id, secret) == signature
}

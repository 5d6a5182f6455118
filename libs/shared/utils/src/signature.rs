use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Checks a webhook signature (base64 HMAC-SHA256 of the raw body keyed by
/// the channel secret) against the raw request body.
pub fn verify_webhook_signature(channel_secret: &str, body: &[u8], signature_b64: &str) -> bool {
    if channel_secret.is_empty() {
        debug!("Channel secret is not set");
        return false;
    }

    let signature = match STANDARD.decode(signature_b64.trim()) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(channel_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);

    if mac.verify_slice(&signature).is_err() {
        debug!("Webhook signature verification failed");
        return false;
    }
    true
}

/// Compares a presented shared secret without short-circuiting on the first
/// differing byte.
pub fn secrets_match(expected: &str, provided: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let digest = |value: &str| {
        HmacSha256::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(value.as_bytes());
            mac
        })
    };

    match (digest(expected), digest(provided)) {
        (Ok(reference), Ok(candidate)) => candidate
            .verify_slice(&reference.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}

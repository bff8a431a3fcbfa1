use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::types::PaymentError;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "Webhook-Signature";

/// Maximum age of a signed webhook before it is rejected as stale
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// A parsed webhook event from the payment provider
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// Provider event name, e.g. `payment.succeeded`
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload
    pub data: WebhookEventData,
}

/// Payload of a webhook event
#[derive(Debug, Deserialize)]
pub struct WebhookEventData {
    /// The booking the payment session was created for
    pub booking_id: Uuid,
    /// Email captured at checkout, when the provider returns it
    pub requester_email: Option<String>,
}

/// Parses a webhook body into an event
pub fn parse_event(body: &[u8]) -> Result<WebhookEvent, PaymentError> {
    serde_json::from_slice(body)
        .map_err(|e| PaymentError::Payload(format!("Failed to parse webhook body: {}", e)))
}

/// Verifies a `t=<unix>,v1=<hex>` signature header against a webhook body.
///
/// The signature is the SHA-256 of `"{secret}.{timestamp}.{body}"`. Headers
/// older than [`DEFAULT_TOLERANCE_SECS`] are rejected even when the digest
/// matches, so a captured webhook cannot be replayed later.
pub fn verify_signature(
    secret: &str,
    header: &str,
    body: &[u8],
    now_unix: i64,
) -> Result<(), PaymentError> {
    let mut timestamp: Option<i64> = None;
    let mut signature: Option<&str> = None;

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signature = Some(value),
            _ => {}
        }
    }

    let (timestamp, signature) = match (timestamp, signature) {
        (Some(timestamp), Some(signature)) => (timestamp, signature),
        _ => return Err(PaymentError::InvalidSignature),
    };

    if (now_unix - timestamp).abs() > DEFAULT_TOLERANCE_SECS {
        return Err(PaymentError::InvalidSignature);
    }

    if compute_signature(secret, timestamp, body) != signature {
        return Err(PaymentError::InvalidSignature);
    }

    Ok(())
}

/// Computes the hex signature for a timestamped webhook body
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(b".");
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(b".");
    hasher.update(body);
    hex::encode(hasher.finalize())
}

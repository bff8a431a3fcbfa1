use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::types::PaymentError;
use crate::webhook;

/// Client for the hosted-checkout payment provider API
#[derive(Clone)]
pub struct PaymentClient {
    client: Client,
    base_url: String,
    api_key: String,
    webhook_secret: String,
}

/// A hosted checkout session created for a pending booking
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    /// Provider-side session id
    pub id: String,
    /// URL the requester is redirected to for payment
    pub url: String,
}

impl PaymentClient {
    /// Creates a client from `PAYMENTS_*` environment variables
    pub fn from_env() -> Result<Self, PaymentError> {
        let api_key = std::env::var("PAYMENTS_API_KEY")
            .map_err(|_| PaymentError::MissingConfig("PAYMENTS_API_KEY".to_string()))?;

        let webhook_secret = std::env::var("PAYMENTS_WEBHOOK_SECRET")
            .map_err(|_| PaymentError::MissingConfig("PAYMENTS_WEBHOOK_SECRET".to_string()))?;

        let base_url = std::env::var("PAYMENTS_BASE_URL")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| PaymentError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            webhook_secret,
        })
    }

    /// Creates a hosted checkout session for a pending booking. The booking
    /// id travels in the session metadata and comes back on the webhook.
    pub async fn create_checkout_session(
        &self,
        booking_id: &Uuid,
        requester_email: &str,
        amount: f64,
        description: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        log::info!("Creating checkout session for booking {}", booking_id);

        let url = format!("{}/v1/checkout/sessions", self.base_url);

        // Provider expects the amount in cents
        let amount_cents = (amount * 100.0).round() as i64;

        let params = [
            ("mode", "payment".to_string()),
            ("customer_email", requester_email.to_string()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", "usd".to_string()),
            (
                "line_items[0][price_data][unit_amount]",
                amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                description.to_string(),
            ),
            ("metadata[booking_id]", booking_id.to_string()),
            ("metadata[requester_email]", requester_email.to_string()),
        ];

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Network(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            log::error!("❌ Checkout session request failed with {}: {}", status, body);

            match status.as_u16() {
                429 => return Err(PaymentError::RateLimited),
                401 | 403 => return Err(PaymentError::AuthenticationFailed),
                _ => return Err(PaymentError::Api(format!("HTTP {} - {}", status, body))),
            }
        }

        let session: CheckoutSession = response
            .json()
            .await
            .map_err(|e| PaymentError::Api(format!("Failed to parse response: {}", e)))?;

        log::info!(
            "✅ Checkout session {} ready for booking {}",
            session.id,
            booking_id
        );

        Ok(session)
    }

    /// Verifies a webhook signature header against the shared secret
    pub fn verify_webhook(&self, signature_header: &str, body: &[u8]) -> Result<(), PaymentError> {
        webhook::verify_signature(
            &self.webhook_secret,
            signature_header,
            body,
            chrono::Utc::now().timestamp(),
        )
    }
}

/// Custom error type for payment-related errors
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Required configuration was missing at startup
    #[error("Missing payment configuration: {0}")]
    MissingConfig(String),

    /// The provider rejected or failed the API call
    #[error("Payment API error: {0}")]
    Api(String),

    /// Rate limited by the payment provider
    #[error("Rate limited by payment provider")]
    RateLimited,

    /// Authentication failed with the payment provider
    #[error("Authentication failed with payment provider")]
    AuthenticationFailed,

    /// The provider could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// A webhook body could not be parsed
    #[error("Invalid webhook payload: {0}")]
    Payload(String),

    /// A webhook signature failed verification
    #[error("Invalid webhook signature")]
    InvalidSignature,
}

impl actix_web::ResponseError for PaymentError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            PaymentError::InvalidSignature => {
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "invalid_signature",
                    "message": "Webhook signature verification failed"
                }))
            }
            PaymentError::Payload(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_payload",
                "message": msg
            })),
            PaymentError::Api(msg) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "payment_provider_error",
                "message": format!("Payment provider error: {}", msg)
            })),
            PaymentError::RateLimited => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "payment_provider_error",
                "message": "Rate limited by the payment provider. Please try again later."
            })),
            PaymentError::AuthenticationFailed => {
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "payment_provider_error",
                    "message": "Failed to authenticate with the payment provider"
                }))
            }
            PaymentError::Network(msg) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "network_error",
                "message": format!("Network error: {}", msg)
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

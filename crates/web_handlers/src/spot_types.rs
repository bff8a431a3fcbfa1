use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A camping spot listed by an owner
#[derive(Debug, Serialize)]
pub struct Spot {
    /// Unique identifier for the spot
    pub id: Uuid,
    /// User who owns and manages the spot
    pub owner_id: Uuid,
    /// Display name of the spot
    pub name: String,
    /// Free-form description shown to campers
    pub description: Option<String>,
    /// Human-readable location
    pub location: Option<String>,
    /// Nightly price in dollars
    pub price_per_night: f64,
    /// Time at which the spot was listed
    pub created_at: DateTime<Utc>,
    /// Time of the last update
    pub updated_at: DateTime<Utc>,
}

/// Request structure for listing a new spot
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSpotRequest {
    /// Display name of the spot
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Free-form description shown to campers
    pub description: Option<String>,

    /// Human-readable location
    pub location: Option<String>,

    /// Nightly price in dollars
    #[validate(range(min = 0.01, message = "Price must be positive"))]
    pub price_per_night: f64,
}

/// Response structure for listing spots
#[derive(Debug, Serialize)]
pub struct ListSpotsResponse {
    /// Spots in the catalog
    pub spots: Vec<Spot>,
    /// Total number of spots returned
    pub total: i64,
}

/// Custom error type for spot catalog errors
#[derive(Debug, thiserror::Error)]
pub enum SpotError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Spot not found
    #[error("Spot not found")]
    NotFound,
}

impl actix_web::ResponseError for SpotError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            SpotError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            SpotError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "spot_not_found",
                "message": "Spot not found"
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

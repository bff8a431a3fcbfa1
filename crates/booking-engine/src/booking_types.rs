use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Created, awaiting payment capture
    Pending,
    /// Payment captured, stay is reserved
    Confirmed,
    /// Cancelled by the requester or the spot owner
    Cancelled,
    /// Stay has elapsed; closed by the completion sweep
    Completed,
    /// Owner blackout entry, blocks the dates without a guest
    Unavailable,
}

impl BookingStatus {
    /// Returns the lowercase string form used in the database and API
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Unavailable => "unavailable",
        }
    }

    /// Parses the lowercase string form, returning `None` for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            "unavailable" => Some(BookingStatus::Unavailable),
            _ => None,
        }
    }

    /// Whether a booking in this status blocks the dates for other requests
    pub fn blocks_availability(&self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Unavailable
        )
    }

    /// Whether the status machine allows moving from this status to `next`
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking row. Covers guest reservations and owner blackout entries;
/// blackouts carry no guest count or cost.
#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// ID of the camping spot being reserved
    pub spot_id: Uuid,
    /// ID of the user who made the booking (the owner for blackouts)
    pub requester_id: Uuid,
    /// First night of the stay
    pub start_date: NaiveDate,
    /// Last night of the stay
    pub end_date: NaiveDate,
    /// Number of guests, absent for blackout entries
    pub guest_count: Option<i32>,
    /// Total cost of the stay, absent for blackout entries
    pub cost: Option<f64>,
    /// Current lifecycle status
    pub status: BookingStatus,
    /// When the booking was created
    pub created_at: DateTime<Utc>,
    /// When the booking was last updated
    pub updated_at: DateTime<Utc>,
}

/// The slice of a conflicting booking exposed to callers. Carries enough to
/// pick alternative dates without revealing who holds the reservation.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictingBooking {
    /// Unique identifier for the conflicting booking
    pub id: Uuid,
    /// First night of the conflicting stay
    pub start_date: NaiveDate,
    /// Last night of the conflicting stay
    pub end_date: NaiveDate,
    /// Status of the conflicting booking
    pub status: BookingStatus,
}

impl From<&Booking> for ConflictingBooking {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            status: booking.status,
        }
    }
}

/// Request structure for creating a new booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    /// ID of the spot to book
    pub spot_id: Uuid,

    /// First night of the stay
    pub start_date: NaiveDate,

    /// Last night of the stay
    pub end_date: NaiveDate,

    /// Number of guests
    #[validate(range(min = 1, message = "At least one guest is required"))]
    pub guest_count: i32,

    /// Total cost of the stay
    #[validate(range(min = 0.01, message = "Cost must be positive"))]
    pub cost: f64,
}

/// Request structure for an owner blackout over a date range
#[derive(Debug, Deserialize)]
pub struct CreateBlackoutRequest {
    /// First blocked night
    pub start_date: NaiveDate,
    /// Last blocked night
    pub end_date: NaiveDate,
}

/// Request structure for moving an existing booking to new dates
#[derive(Debug, Deserialize)]
pub struct UpdateBookingDatesRequest {
    /// New first night of the stay
    pub start_date: NaiveDate,
    /// New last night of the stay
    pub end_date: NaiveDate,
}

/// Custom error type for booking operations
#[derive(thiserror::Error, Debug)]
pub enum BookingError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A request field failed validation
    #[error("Validation error on {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: String,
        /// What was wrong with it
        message: String,
    },

    /// End date is not after start date
    #[error("Invalid date range: end date must be after start date")]
    InvalidDateRange,

    /// An identical booking by the same requester already exists
    #[error("Duplicate booking request (existing booking {booking_id})")]
    DuplicateBooking {
        /// ID of the already stored booking
        booking_id: Uuid,
    },

    /// The requested dates overlap existing active bookings
    #[error("Requested dates conflict with {} existing booking(s)", conflicts.len())]
    DateConflict {
        /// The bookings blocking the requested range
        conflicts: Vec<ConflictingBooking>,
    },

    /// The status machine forbids this transition
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// Status the booking is currently in
        from: BookingStatus,
        /// Status the caller tried to move it to
        to: BookingStatus,
    },

    /// Booking not found
    #[error("Booking not found")]
    NotFound,

    /// Spot not found
    #[error("Spot not found")]
    SpotNotFound,

    /// Caller is not a party to this booking
    #[error("Unauthorized access to booking")]
    Unauthorized,

    /// Data format error
    #[error("Data format error: {0}")]
    DataFormat(String),
}

impl BookingError {
    /// Collapses derive-level validation errors into the single-field shape
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "request".to_string());

        BookingError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

impl actix_web::ResponseError for BookingError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            BookingError::Validation { field, message } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "validation_error",
                    "field": field,
                    "message": message
                }))
            }
            BookingError::InvalidDateRange => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "invalid_date_range",
                "message": "End date must be after start date"
            })),
            BookingError::DuplicateBooking { booking_id } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": "duplicate_booking",
                    "message": "An identical booking already exists",
                    "booking_id": booking_id
                }))
            }
            BookingError::DateConflict { conflicts } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": "date_conflict",
                    "message": "The requested dates are no longer available",
                    "conflicts": conflicts
                }))
            }
            BookingError::InvalidTransition { from, to } => {
                HttpResponse::Conflict().json(serde_json::json!({
                    "error": "invalid_transition",
                    "message": format!("Cannot change booking status from {} to {}", from, to)
                }))
            }
            BookingError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "booking_not_found",
                "message": "Booking not found"
            })),
            BookingError::SpotNotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "spot_not_found",
                "message": "Spot not found"
            })),
            BookingError::Unauthorized => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "unauthorized",
                "message": "You are not authorized to access this booking"
            })),
            BookingError::DataFormat(msg) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "data_format_error",
                    "message": format!("Data format error: {}", msg)
                }))
            }
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_string_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
            BookingStatus::Unavailable,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }

        assert_eq!(BookingStatus::parse("paused"), None);
        assert_eq!(BookingStatus::parse("Pending"), None);
    }

    #[test]
    fn only_active_statuses_block_availability() {
        assert!(BookingStatus::Pending.blocks_availability());
        assert!(BookingStatus::Confirmed.blocks_availability());
        assert!(BookingStatus::Unavailable.blocks_availability());
        assert!(!BookingStatus::Cancelled.blocks_availability());
        assert!(!BookingStatus::Completed.blocks_availability());
    }

    #[test]
    fn allowed_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn forbidden_transitions() {
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Unavailable.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Confirmed));
    }
}

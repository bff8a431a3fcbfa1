use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A booking joined with its spot's display name, as returned to clients
#[derive(Debug, Serialize)]
pub struct BookingWithSpot {
    /// Unique identifier for the booking
    pub id: Uuid,
    /// Spot the booking is held on
    pub spot_id: Uuid,
    /// Display name of the spot
    pub spot_name: String,
    /// First night of the stay
    pub start_date: NaiveDate,
    /// Last night of the stay
    pub end_date: NaiveDate,
    /// Number of guests
    pub guest_count: Option<i32>,
    /// Total cost of the stay
    pub cost: Option<f64>,
    /// Lifecycle status of the booking
    pub status: String,
    /// Time at which the booking was created
    pub created_at: DateTime<Utc>,
}

/// Response structure for listing bookings
#[derive(Debug, Serialize)]
pub struct ListBookingsResponse {
    /// Bookings belonging to the caller
    pub bookings: Vec<BookingWithSpot>,
    /// Total number of bookings returned
    pub total: i64,
}

/// Query parameters for an availability check
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// First night of the prospective stay
    pub start_date: NaiveDate,
    /// Last night of the prospective stay
    pub end_date: NaiveDate,
}

/// Response structure for an availability check
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    /// Spot the check ran against
    pub spot_id: Uuid,
    /// First night of the prospective stay
    pub start_date: NaiveDate,
    /// Last night of the prospective stay
    pub end_date: NaiveDate,
    /// Whether the range is free of active bookings
    pub available: bool,
}

/// Response structure for a created checkout session
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Provider-side checkout session id
    pub session_id: String,
    /// URL the requester should be redirected to
    pub checkout_url: String,
}

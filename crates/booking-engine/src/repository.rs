use chrono::NaiveDate;
use uuid::Uuid;

use crate::booking_types::{Booking, BookingError, BookingStatus};

/// A booking to be persisted. The store assigns the id and timestamps.
#[derive(Debug, Clone)]
pub struct NewBooking {
    /// ID of the spot being reserved
    pub spot_id: Uuid,
    /// ID of the user making the booking (the owner for blackouts)
    pub requester_id: Uuid,
    /// First night of the stay
    pub start_date: NaiveDate,
    /// Last night of the stay
    pub end_date: NaiveDate,
    /// Number of guests, absent for blackout entries
    pub guest_count: Option<i32>,
    /// Total cost, absent for blackout entries
    pub cost: Option<f64>,
    /// Initial lifecycle status
    pub status: BookingStatus,
}

/// Storage interface consumed by the booking engine.
///
/// Queries that feed availability decisions filter out the statuses that do
/// not block dates at the query itself, so cancelled and completed rows never
/// reach the engine's overlap scan.
#[async_trait::async_trait]
pub trait BookingRepository: Send + Sync {
    /// Whether the spot exists at all
    async fn spot_exists(&self, spot_id: &Uuid) -> Result<bool, BookingError>;

    /// All bookings for the spot whose status blocks availability
    async fn list_active_bookings_for_spot(
        &self,
        spot_id: &Uuid,
    ) -> Result<Vec<Booking>, BookingError>;

    /// A non-cancelled booking matching spot, requester and both dates
    /// exactly, if one exists
    async fn find_active_duplicate(
        &self,
        spot_id: &Uuid,
        requester_id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Booking>, BookingError>;

    /// Fetches a booking by id
    async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, BookingError>;

    /// Persists a new booking and returns the stored row
    async fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, BookingError>;

    /// Guarded status update: applies `from` -> `to` only if the row is still
    /// in `from`, returning the updated row or `None` when the guard fails
    async fn update_booking_status(
        &self,
        id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, BookingError>;

    /// Moves a booking to new dates and returns the updated row
    async fn update_booking_dates(
        &self,
        id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Booking, BookingError>;

    /// Removes a booking row entirely, returning whether one was removed
    async fn delete_booking(&self, id: &Uuid) -> Result<bool, BookingError>;

    /// Confirmed bookings whose end date lies strictly before `today`
    async fn list_completable_bookings(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, BookingError>;
}

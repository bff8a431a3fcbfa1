use chrono::NaiveDate;
use uuid::Uuid;

use crate::booking_types::{Booking, BookingStatus, ConflictingBooking};

/// Closed-interval overlap test for two date ranges.
///
/// Both endpoints count as occupied nights, so a booking ending on a given
/// day and another starting on that same day overlap.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Scans the active bookings of a spot for overlaps with the requested range.
///
/// `existing` is expected to already be filtered to availability-blocking
/// statuses by the repository query. `exclude` drops one booking from
/// consideration, used when a booking is being moved to new dates.
pub fn conflicting_bookings(
    existing: &[Booking],
    start_date: NaiveDate,
    end_date: NaiveDate,
    exclude: Option<Uuid>,
) -> Vec<ConflictingBooking> {
    existing
        .iter()
        .filter(|booking| exclude != Some(booking.id))
        .filter(|booking| {
            ranges_overlap(start_date, end_date, booking.start_date, booking.end_date)
        })
        .map(ConflictingBooking::from)
        .collect()
}

/// Whether a booking may still be cancelled on the given day.
///
/// Cancellation is open through the last night of the stay; once the end
/// date has passed the booking belongs to the completion sweep. Applied by
/// the HTTP layer as caller policy, not by the status machine itself.
pub fn cancellation_window_open(booking: &Booking, today: NaiveDate) -> bool {
    booking.end_date >= today
}

/// Whether the completion sweep should close this booking out.
pub fn completion_due(booking: &Booking, today: NaiveDate) -> bool {
    booking.status == BookingStatus::Confirmed && booking.end_date < today
}

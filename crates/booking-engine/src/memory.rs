use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::booking_types::{Booking, BookingError, BookingStatus};
use crate::repository::{BookingRepository, NewBooking};

/// In-memory booking repository for development and testing.
///
/// Spots must be registered before bookings against them are accepted,
/// mirroring the foreign key in the real store.
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
    spots: RwLock<HashSet<Uuid>>,
}

impl InMemoryBookingRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
            spots: RwLock::new(HashSet::new()),
        }
    }

    /// Makes a spot id known to the repository
    pub async fn register_spot(&self, spot_id: Uuid) {
        self.spots.write().await.insert(spot_id);
    }
}

#[async_trait::async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn spot_exists(&self, spot_id: &Uuid) -> Result<bool, BookingError> {
        Ok(self.spots.read().await.contains(spot_id))
    }

    async fn list_active_bookings_for_spot(
        &self,
        spot_id: &Uuid,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = self.bookings.read().await;

        Ok(bookings
            .values()
            .filter(|b| b.spot_id == *spot_id && b.status.blocks_availability())
            .cloned()
            .collect())
    }

    async fn find_active_duplicate(
        &self,
        spot_id: &Uuid,
        requester_id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Booking>, BookingError> {
        let bookings = self.bookings.read().await;

        Ok(bookings
            .values()
            .find(|b| {
                b.spot_id == *spot_id
                    && b.requester_id == *requester_id
                    && b.start_date == start_date
                    && b.end_date == end_date
                    && b.status != BookingStatus::Cancelled
            })
            .cloned())
    }

    async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, BookingError> {
        Ok(self.bookings.read().await.get(id).cloned())
    }

    async fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, BookingError> {
        let now = Utc::now();
        let stored = Booking {
            id: Uuid::new_v4(),
            spot_id: booking.spot_id,
            requester_id: booking.requester_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            guest_count: booking.guest_count,
            cost: booking.cost,
            status: booking.status,
            created_at: now,
            updated_at: now,
        };

        self.bookings.write().await.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_booking_status(
        &self,
        id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, BookingError> {
        let mut bookings = self.bookings.write().await;

        match bookings.get_mut(id) {
            Some(booking) if booking.status == from => {
                booking.status = to;
                booking.updated_at = Utc::now();
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn update_booking_dates(
        &self,
        id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let mut bookings = self.bookings.write().await;

        match bookings.get_mut(id) {
            Some(booking) => {
                booking.start_date = start_date;
                booking.end_date = end_date;
                booking.updated_at = Utc::now();
                Ok(booking.clone())
            }
            None => Err(BookingError::NotFound),
        }
    }

    async fn delete_booking(&self, id: &Uuid) -> Result<bool, BookingError> {
        Ok(self.bookings.write().await.remove(id).is_some())
    }

    async fn list_completable_bookings(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, BookingError> {
        let bookings = self.bookings.read().await;

        Ok(bookings
            .values()
            .filter(|b| b.status == BookingStatus::Confirmed && b.end_date < today)
            .cloned()
            .collect())
    }
}

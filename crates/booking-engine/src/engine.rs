use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::availability::{completion_due, conflicting_bookings};
use crate::booking_types::*;
use crate::repository::{BookingRepository, NewBooking};

/// Tunable booking rules
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    /// Largest party size a single booking may carry (default: 20)
    pub max_guest_count: i32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            max_guest_count: 20,
        }
    }
}

impl BookingPolicy {
    /// Reads the policy from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let max_guest_count = std::env::var("MAX_GUEST_COUNT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(20);

        Self { max_guest_count }
    }
}

/// Decision layer for booking requests and lifecycle transitions.
///
/// The engine validates, checks duplicates and availability, and asks the
/// repository to apply writes. It performs no I/O of its own beyond the
/// repository calls and never retries.
pub struct BookingEngine {
    repository: Arc<dyn BookingRepository>,
    policy: BookingPolicy,
}

impl BookingEngine {
    /// Creates an engine over the given repository
    pub fn new(repository: Arc<dyn BookingRepository>, policy: Option<BookingPolicy>) -> Self {
        Self {
            repository,
            policy: policy.unwrap_or_default(),
        }
    }

    /// Runs the full acceptance workflow for a booking request: shape
    /// validation, duplicate check, availability check, then persistence as
    /// `Pending`.
    pub async fn create_booking(
        &self,
        requester_id: &Uuid,
        request: &CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        if request.end_date <= request.start_date {
            return Err(BookingError::InvalidDateRange);
        }

        if request.guest_count < 1 || request.guest_count > self.policy.max_guest_count {
            return Err(BookingError::Validation {
                field: "guest_count".to_string(),
                message: format!(
                    "Guest count must be between 1 and {}",
                    self.policy.max_guest_count
                ),
            });
        }

        if request.cost <= 0.0 {
            return Err(BookingError::Validation {
                field: "cost".to_string(),
                message: "Cost must be positive".to_string(),
            });
        }

        if !self.repository.spot_exists(&request.spot_id).await? {
            return Err(BookingError::SpotNotFound);
        }

        // A retried submission returns the stored id instead of a conflict
        if let Some(existing) = self
            .repository
            .find_active_duplicate(
                &request.spot_id,
                requester_id,
                request.start_date,
                request.end_date,
            )
            .await?
        {
            debug!(
                "duplicate booking request for spot {} by requester {}",
                request.spot_id, requester_id
            );
            return Err(BookingError::DuplicateBooking {
                booking_id: existing.id,
            });
        }

        let active = self
            .repository
            .list_active_bookings_for_spot(&request.spot_id)
            .await?;
        let conflicts = conflicting_bookings(&active, request.start_date, request.end_date, None);

        if !conflicts.is_empty() {
            return Err(BookingError::DateConflict { conflicts });
        }

        let booking = self
            .repository
            .insert_booking(&NewBooking {
                spot_id: request.spot_id,
                requester_id: *requester_id,
                start_date: request.start_date,
                end_date: request.end_date,
                guest_count: Some(request.guest_count),
                cost: Some(request.cost),
                status: BookingStatus::Pending,
            })
            .await?;

        info!(
            "created booking {} for spot {} ({} to {})",
            booking.id, booking.spot_id, booking.start_date, booking.end_date
        );

        Ok(booking)
    }

    /// Blocks a date range on behalf of the spot owner. Blackouts take part
    /// in availability like any confirmed stay but carry no guest or cost.
    pub async fn create_blackout(
        &self,
        owner_id: &Uuid,
        spot_id: &Uuid,
        request: &CreateBlackoutRequest,
    ) -> Result<Booking, BookingError> {
        if request.end_date <= request.start_date {
            return Err(BookingError::InvalidDateRange);
        }

        if !self.repository.spot_exists(spot_id).await? {
            return Err(BookingError::SpotNotFound);
        }

        let active = self.repository.list_active_bookings_for_spot(spot_id).await?;
        let conflicts = conflicting_bookings(&active, request.start_date, request.end_date, None);

        if !conflicts.is_empty() {
            return Err(BookingError::DateConflict { conflicts });
        }

        let booking = self
            .repository
            .insert_booking(&NewBooking {
                spot_id: *spot_id,
                requester_id: *owner_id,
                start_date: request.start_date,
                end_date: request.end_date,
                guest_count: None,
                cost: None,
                status: BookingStatus::Unavailable,
            })
            .await?;

        info!(
            "created blackout {} for spot {} ({} to {})",
            booking.id, booking.spot_id, booking.start_date, booking.end_date
        );

        Ok(booking)
    }

    /// Whether the requested range is free of active bookings. `exclude`
    /// removes one booking from consideration, used when moving an existing
    /// booking to new dates.
    pub async fn is_available(
        &self,
        spot_id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<bool, BookingError> {
        if end_date <= start_date {
            return Err(BookingError::InvalidDateRange);
        }

        if !self.repository.spot_exists(spot_id).await? {
            return Err(BookingError::SpotNotFound);
        }

        let active = self.repository.list_active_bookings_for_spot(spot_id).await?;

        Ok(conflicting_bookings(&active, start_date, end_date, exclude).is_empty())
    }

    /// Fetches a booking by id
    pub async fn get_booking(&self, id: &Uuid) -> Result<Booking, BookingError> {
        self.repository
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound)
    }

    /// Marks a pending booking as confirmed after payment capture
    pub async fn confirm_booking(&self, id: &Uuid) -> Result<Booking, BookingError> {
        let booking = self.apply_transition(id, BookingStatus::Confirmed).await?;
        info!("confirmed booking {}", booking.id);
        Ok(booking)
    }

    /// Cancels a pending or confirmed booking, freeing its dates
    pub async fn cancel_booking(&self, id: &Uuid) -> Result<Booking, BookingError> {
        let booking = self.apply_transition(id, BookingStatus::Cancelled).await?;
        info!("cancelled booking {}", booking.id);
        Ok(booking)
    }

    /// Cancels a booking only while it is still pending, used when a checkout
    /// session expires. Returns `None` when the booking is missing or has
    /// already moved on, so a late expiry can never undo a settled payment.
    pub async fn expire_pending_booking(
        &self,
        id: &Uuid,
    ) -> Result<Option<Booking>, BookingError> {
        let expired = self
            .repository
            .update_booking_status(id, BookingStatus::Pending, BookingStatus::Cancelled)
            .await?;

        if let Some(booking) = &expired {
            info!("expired pending booking {}", booking.id);
        }

        Ok(expired)
    }

    /// Moves a pending or confirmed booking to new dates, re-running the
    /// availability check with the booking itself excluded
    pub async fn update_booking_dates(
        &self,
        id: &Uuid,
        request: &UpdateBookingDatesRequest,
    ) -> Result<Booking, BookingError> {
        if request.end_date <= request.start_date {
            return Err(BookingError::InvalidDateRange);
        }

        let booking = self
            .repository
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if !matches!(
            booking.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ) {
            error!(
                "attempted to move dates of {} booking {}",
                booking.status, booking.id
            );
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: booking.status,
            });
        }

        let active = self
            .repository
            .list_active_bookings_for_spot(&booking.spot_id)
            .await?;
        let conflicts = conflicting_bookings(
            &active,
            request.start_date,
            request.end_date,
            Some(booking.id),
        );

        if !conflicts.is_empty() {
            return Err(BookingError::DateConflict { conflicts });
        }

        let updated = self
            .repository
            .update_booking_dates(id, request.start_date, request.end_date)
            .await?;

        info!(
            "moved booking {} to {} - {}",
            updated.id, updated.start_date, updated.end_date
        );

        Ok(updated)
    }

    /// Removes an owner blackout entry, deleting the row outright. Regular
    /// bookings are never deleted through this path.
    pub async fn remove_blackout(&self, id: &Uuid) -> Result<(), BookingError> {
        let booking = self
            .repository
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if booking.status != BookingStatus::Unavailable {
            return Err(BookingError::NotFound);
        }

        if !self.repository.delete_booking(id).await? {
            return Err(BookingError::NotFound);
        }

        info!("removed blackout {} from spot {}", booking.id, booking.spot_id);

        Ok(())
    }

    /// Closes out confirmed bookings whose stay has elapsed, returning how
    /// many were completed. Rows that change status under the sweep lose the
    /// update guard and are skipped.
    pub async fn complete_elapsed_bookings(&self, today: NaiveDate) -> Result<u64, BookingError> {
        let due = self.repository.list_completable_bookings(today).await?;
        let mut completed = 0u64;

        for booking in due {
            if !completion_due(&booking, today) {
                continue;
            }

            match self
                .repository
                .update_booking_status(
                    &booking.id,
                    BookingStatus::Confirmed,
                    BookingStatus::Completed,
                )
                .await?
            {
                Some(_) => completed += 1,
                None => warn!("booking {} changed status before completion", booking.id),
            }
        }

        if completed > 0 {
            info!("completed {} elapsed booking(s)", completed);
        }

        Ok(completed)
    }

    /// Applies a guarded status transition after checking the status machine
    async fn apply_transition(
        &self,
        id: &Uuid,
        to: BookingStatus,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .repository
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if !booking.status.can_transition_to(to) {
            error!(
                "invalid status transition attempted on booking {}: {} -> {}",
                booking.id, booking.status, to
            );
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to,
            });
        }

        match self
            .repository
            .update_booking_status(id, booking.status, to)
            .await?
        {
            Some(updated) => Ok(updated),
            None => {
                error!(
                    "booking {} changed status while moving {} -> {}",
                    id, booking.status, to
                );
                Err(BookingError::InvalidTransition {
                    from: booking.status,
                    to,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBookingRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(spot_id: Uuid, start: NaiveDate, end: NaiveDate) -> CreateBookingRequest {
        CreateBookingRequest {
            spot_id,
            start_date: start,
            end_date: end,
            guest_count: 2,
            cost: 180.0,
        }
    }

    async fn engine_with_spot() -> (BookingEngine, Uuid) {
        let repository = Arc::new(InMemoryBookingRepository::new());
        let spot_id = Uuid::new_v4();
        repository.register_spot(spot_id).await;

        (BookingEngine::new(repository, None), spot_id)
    }

    #[tokio::test]
    async fn create_booking_stores_pending_booking() {
        let (engine, spot_id) = engine_with_spot().await;
        let requester = Uuid::new_v4();

        let booking = engine
            .create_booking(&requester, &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)))
            .await
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.spot_id, spot_id);
        assert_eq!(booking.requester_id, requester);
        assert_eq!(booking.guest_count, Some(2));
        assert_eq!(booking.cost, Some(180.0));
    }

    #[tokio::test]
    async fn create_booking_rejects_inverted_and_empty_ranges() {
        let (engine, spot_id) = engine_with_spot().await;
        let requester = Uuid::new_v4();

        let inverted = engine
            .create_booking(&requester, &request(spot_id, date(2025, 7, 5), date(2025, 7, 1)))
            .await
            .unwrap_err();
        assert!(matches!(inverted, BookingError::InvalidDateRange));

        let empty = engine
            .create_booking(&requester, &request(spot_id, date(2025, 7, 1), date(2025, 7, 1)))
            .await
            .unwrap_err();
        assert!(matches!(empty, BookingError::InvalidDateRange));
    }

    #[tokio::test]
    async fn create_booking_enforces_guest_count_policy() {
        let (engine, spot_id) = engine_with_spot().await;
        let requester = Uuid::new_v4();

        let mut too_few = request(spot_id, date(2025, 7, 1), date(2025, 7, 5));
        too_few.guest_count = 0;
        let err = engine.create_booking(&requester, &too_few).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation { ref field, .. } if field == "guest_count"));

        let mut too_many = request(spot_id, date(2025, 7, 1), date(2025, 7, 5));
        too_many.guest_count = 21;
        let err = engine.create_booking(&requester, &too_many).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation { ref field, .. } if field == "guest_count"));
    }

    #[tokio::test]
    async fn guest_count_policy_is_configurable() {
        let repository = Arc::new(InMemoryBookingRepository::new());
        let spot_id = Uuid::new_v4();
        repository.register_spot(spot_id).await;

        let engine =
            BookingEngine::new(repository, Some(BookingPolicy { max_guest_count: 4 }));

        let mut over = request(spot_id, date(2025, 7, 1), date(2025, 7, 5));
        over.guest_count = 5;
        let err = engine
            .create_booking(&Uuid::new_v4(), &over)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation { .. }));
    }

    #[tokio::test]
    async fn create_booking_rejects_nonpositive_cost() {
        let (engine, spot_id) = engine_with_spot().await;

        let mut free = request(spot_id, date(2025, 7, 1), date(2025, 7, 5));
        free.cost = 0.0;
        let err = engine
            .create_booking(&Uuid::new_v4(), &free)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Validation { ref field, .. } if field == "cost"));
    }

    #[tokio::test]
    async fn create_booking_rejects_unknown_spot() {
        let repository = Arc::new(InMemoryBookingRepository::new());
        let engine = BookingEngine::new(repository, None);

        let err = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(Uuid::new_v4(), date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::SpotNotFound));
    }

    #[tokio::test]
    async fn duplicate_submission_returns_existing_booking_id() {
        let (engine, spot_id) = engine_with_spot().await;
        let requester = Uuid::new_v4();
        let req = request(spot_id, date(2025, 7, 1), date(2025, 7, 5));

        let first = engine.create_booking(&requester, &req).await.unwrap();
        let err = engine.create_booking(&requester, &req).await.unwrap_err();

        match err {
            BookingError::DuplicateBooking { booking_id } => assert_eq!(booking_id, first.id),
            other => panic!("expected duplicate booking, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_check_requires_exact_dates() {
        let (engine, spot_id) = engine_with_spot().await;
        let requester = Uuid::new_v4();

        engine
            .create_booking(&requester, &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)))
            .await
            .unwrap();

        // Same requester, different dates: not a duplicate, just a normal
        // booking that must clear the availability check
        let second = engine
            .create_booking(&requester, &request(spot_id, date(2025, 7, 10), date(2025, 7, 12)))
            .await
            .unwrap();
        assert_eq!(second.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn bookings_sharing_a_boundary_date_conflict() {
        let (engine, spot_id) = engine_with_spot().await;

        let first = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let err = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 5), date(2025, 7, 8)),
            )
            .await
            .unwrap_err();

        match err {
            BookingError::DateConflict { conflicts } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].id, first.id);
            }
            other => panic!("expected date conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn adjacent_bookings_do_not_conflict() {
        let (engine, spot_id) = engine_with_spot().await;

        engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let next_day = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 6), date(2025, 7, 8)),
            )
            .await
            .unwrap();
        assert_eq!(next_day.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn cancellation_frees_the_dates() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        engine.cancel_booking(&booking.id).await.unwrap();

        assert!(
            engine
                .is_available(&spot_id, date(2025, 7, 1), date(2025, 7, 5), None)
                .await
                .unwrap()
        );

        let rebooked = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        assert_eq!(rebooked.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn completion_frees_the_dates() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        engine.confirm_booking(&booking.id).await.unwrap();

        let completed = engine
            .complete_elapsed_bookings(date(2025, 7, 10))
            .await
            .unwrap();
        assert_eq!(completed, 1);

        assert!(
            engine
                .is_available(&spot_id, date(2025, 7, 1), date(2025, 7, 5), None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn confirm_moves_pending_to_confirmed() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let confirmed = engine.confirm_booking(&booking.id).await.unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn confirm_rejects_cancelled_booking() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        engine.cancel_booking(&booking.id).await.unwrap();

        let err = engine.confirm_booking(&booking.id).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidTransition {
                from: BookingStatus::Cancelled,
                to: BookingStatus::Confirmed,
            }
        ));
    }

    #[tokio::test]
    async fn completed_bookings_reject_further_transitions() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        engine.confirm_booking(&booking.id).await.unwrap();
        engine
            .complete_elapsed_bookings(date(2025, 7, 10))
            .await
            .unwrap();

        let confirm = engine.confirm_booking(&booking.id).await.unwrap_err();
        assert!(matches!(
            confirm,
            BookingError::InvalidTransition {
                from: BookingStatus::Completed,
                ..
            }
        ));

        let cancel = engine.cancel_booking(&booking.id).await.unwrap_err();
        assert!(matches!(
            cancel,
            BookingError::InvalidTransition {
                from: BookingStatus::Completed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn sweep_never_completes_pending_bookings() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let completed = engine
            .complete_elapsed_bookings(date(2025, 7, 10))
            .await
            .unwrap();
        assert_eq!(completed, 0);

        let unchanged = engine.confirm_booking(&booking.id).await.unwrap();
        assert_eq!(unchanged.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn sweep_leaves_ongoing_stays_alone() {
        let (engine, spot_id) = engine_with_spot().await;

        let ongoing = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 8), date(2025, 7, 12)),
            )
            .await
            .unwrap();
        engine.confirm_booking(&ongoing.id).await.unwrap();

        let elapsed = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        engine.confirm_booking(&elapsed.id).await.unwrap();

        // July 10: the first stay is mid-visit, the second has ended
        let completed = engine
            .complete_elapsed_bookings(date(2025, 7, 10))
            .await
            .unwrap();
        assert_eq!(completed, 1);

        let err = engine.confirm_booking(&ongoing.id).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidTransition {
                from: BookingStatus::Confirmed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn expiry_only_touches_pending_bookings() {
        let (engine, spot_id) = engine_with_spot().await;

        let pending = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let expired = engine.expire_pending_booking(&pending.id).await.unwrap();
        assert_eq!(expired.map(|b| b.status), Some(BookingStatus::Cancelled));

        let confirmed = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 10), date(2025, 7, 12)),
            )
            .await
            .unwrap();
        engine.confirm_booking(&confirmed.id).await.unwrap();

        // A late expiry after payment settles changes nothing
        let expired = engine.expire_pending_booking(&confirmed.id).await.unwrap();
        assert!(expired.is_none());
        assert_eq!(
            engine.get_booking(&confirmed.id).await.unwrap().status,
            BookingStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn update_dates_excludes_the_booking_itself() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        // Shifting by one day overlaps the old range, which must not count
        let moved = engine
            .update_booking_dates(
                &booking.id,
                &UpdateBookingDatesRequest {
                    start_date: date(2025, 7, 2),
                    end_date: date(2025, 7, 6),
                },
            )
            .await
            .unwrap();

        assert_eq!(moved.start_date, date(2025, 7, 2));
        assert_eq!(moved.end_date, date(2025, 7, 6));
    }

    #[tokio::test]
    async fn update_dates_still_respects_other_bookings() {
        let (engine, spot_id) = engine_with_spot().await;

        engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 10), date(2025, 7, 15)),
            )
            .await
            .unwrap();

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let err = engine
            .update_booking_dates(
                &booking.id,
                &UpdateBookingDatesRequest {
                    start_date: date(2025, 7, 12),
                    end_date: date(2025, 7, 16),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DateConflict { .. }));
    }

    #[tokio::test]
    async fn update_dates_rejects_cancelled_booking() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        engine.cancel_booking(&booking.id).await.unwrap();

        let err = engine
            .update_booking_dates(
                &booking.id,
                &UpdateBookingDatesRequest {
                    start_date: date(2025, 7, 2),
                    end_date: date(2025, 7, 6),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookingError::InvalidTransition {
                from: BookingStatus::Cancelled,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn blackout_blocks_overlapping_bookings() {
        let (engine, spot_id) = engine_with_spot().await;
        let owner = Uuid::new_v4();

        let blackout = engine
            .create_blackout(
                &owner,
                &spot_id,
                &CreateBlackoutRequest {
                    start_date: date(2025, 7, 1),
                    end_date: date(2025, 7, 10),
                },
            )
            .await
            .unwrap();
        assert_eq!(blackout.status, BookingStatus::Unavailable);
        assert_eq!(blackout.guest_count, None);
        assert_eq!(blackout.cost, None);

        let err = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 5), date(2025, 7, 8)),
            )
            .await
            .unwrap_err();

        match err {
            BookingError::DateConflict { conflicts } => {
                assert_eq!(conflicts[0].status, BookingStatus::Unavailable);
            }
            other => panic!("expected date conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn removing_a_blackout_reopens_the_dates() {
        let (engine, spot_id) = engine_with_spot().await;

        let blackout = engine
            .create_blackout(
                &Uuid::new_v4(),
                &spot_id,
                &CreateBlackoutRequest {
                    start_date: date(2025, 7, 1),
                    end_date: date(2025, 7, 10),
                },
            )
            .await
            .unwrap();

        engine.remove_blackout(&blackout.id).await.unwrap();

        assert!(
            engine
                .is_available(&spot_id, date(2025, 7, 1), date(2025, 7, 10), None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn remove_blackout_refuses_regular_bookings() {
        let (engine, spot_id) = engine_with_spot().await;

        let booking = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();

        let err = engine.remove_blackout(&booking.id).await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound));

        // The booking row is untouched
        let still_there = engine.confirm_booking(&booking.id).await.unwrap();
        assert_eq!(still_there.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn is_available_rejects_invalid_ranges() {
        let (engine, spot_id) = engine_with_spot().await;

        let err = engine
            .is_available(&spot_id, date(2025, 7, 5), date(2025, 7, 1), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidDateRange));

        let err = engine
            .is_available(&spot_id, date(2025, 7, 5), date(2025, 7, 5), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::InvalidDateRange));
    }

    #[tokio::test]
    async fn weekend_rebooking_scenario() {
        let (engine, spot_id) = engine_with_spot().await;

        let first = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 1), date(2025, 7, 5)),
            )
            .await
            .unwrap();
        engine.confirm_booking(&first.id).await.unwrap();

        // Mid-range overlap is turned away with the blocker attached
        let err = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 3), date(2025, 7, 6)),
            )
            .await
            .unwrap_err();
        match err {
            BookingError::DateConflict { conflicts } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].id, first.id);
                assert_eq!(conflicts[0].status, BookingStatus::Confirmed);
            }
            other => panic!("expected date conflict, got {:?}", other),
        }

        // Checkout day and check-in day on the same calendar date collide
        let err = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 5), date(2025, 7, 8)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::DateConflict { .. }));

        // The day after checkout is free
        let follow_up = engine
            .create_booking(
                &Uuid::new_v4(),
                &request(spot_id, date(2025, 7, 6), date(2025, 7, 8)),
            )
            .await
            .unwrap();
        assert_eq!(follow_up.status, BookingStatus::Pending);
    }
}

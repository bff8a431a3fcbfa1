use async_trait::async_trait;
use booking_engine::{
    Booking, BookingError, BookingRepository, BookingStatus, NewBooking, conflicting_bookings,
};
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// PostgreSQL-backed implementation of [`BookingRepository`].
///
/// The `bookings` table carries an exclusion constraint over active rows and
/// a partial unique index over live duplicates, so two racing writers cannot
/// both commit. Violations are translated back into the same conflict errors
/// the engine raises on its read-then-check pass, and the loser of a race
/// receives an ordinary conflict response.
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    /// Creates a new repository over the provided connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn booking_from_row(row: &PgRow) -> Result<Booking, BookingError> {
        let status_text: String = row.get("status");
        let status = BookingStatus::parse(&status_text).ok_or_else(|| {
            BookingError::DataFormat(format!("unknown booking status: {}", status_text))
        })?;

        Ok(Booking {
            id: row.get("id"),
            spot_id: row.get("spot_id"),
            requester_id: row.get("requester_id"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            guest_count: row.get("guest_count"),
            cost: row.get("cost"),
            status,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    /// Translates exclusion and unique violations from the database into the
    /// conflict errors the engine reports, re-reading the blocking rows so
    /// the loser of a write race gets the same response shape as a
    /// sequential caller.
    async fn map_write_conflict(
        &self,
        err: sqlx::Error,
        spot_id: &Uuid,
        requester_id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        exclude: Option<Uuid>,
    ) -> BookingError {
        let code = match &err {
            sqlx::Error::Database(db_err) => db_err.code().map(|c| c.to_string()),
            _ => None,
        };

        match code.as_deref() {
            // Exclusion constraint: another active row overlaps the range
            Some("23P01") => match self.list_active_bookings_for_spot(spot_id).await {
                Ok(active) => BookingError::DateConflict {
                    conflicts: conflicting_bookings(&active, start_date, end_date, exclude),
                },
                Err(requery) => requery,
            },
            // Partial unique index: same requester, spot, and exact dates
            Some("23505") => match self
                .find_active_duplicate(spot_id, requester_id, start_date, end_date)
                .await
            {
                Ok(Some(existing)) => BookingError::DuplicateBooking {
                    booking_id: existing.id,
                },
                Ok(None) => err.into(),
                Err(requery) => requery,
            },
            _ => err.into(),
        }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn spot_exists(&self, spot_id: &Uuid) -> Result<bool, BookingError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM spots WHERE id = $1) as present")
            .bind(spot_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }

    async fn list_active_bookings_for_spot(
        &self,
        spot_id: &Uuid,
    ) -> Result<Vec<Booking>, BookingError> {
        // Status list must stay in sync with BookingStatus::blocks_availability
        let rows = sqlx::query(
            r#"
            SELECT id, spot_id, requester_id, start_date, end_date,
                   guest_count, cost, status, created_at, updated_at
            FROM bookings
            WHERE spot_id = $1 AND status IN ('pending', 'confirmed', 'unavailable')
            ORDER BY start_date
            "#,
        )
        .bind(spot_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::booking_from_row).collect()
    }

    async fn find_active_duplicate(
        &self,
        spot_id: &Uuid,
        requester_id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<Booking>, BookingError> {
        let row = sqlx::query(
            r#"
            SELECT id, spot_id, requester_id, start_date, end_date,
                   guest_count, cost, status, created_at, updated_at
            FROM bookings
            WHERE spot_id = $1 AND requester_id = $2
              AND start_date = $3 AND end_date = $4
              AND status <> 'cancelled'
            LIMIT 1
            "#,
        )
        .bind(spot_id)
        .bind(requester_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::booking_from_row(&row)).transpose()
    }

    async fn get_booking(&self, id: &Uuid) -> Result<Option<Booking>, BookingError> {
        let row = sqlx::query(
            r#"
            SELECT id, spot_id, requester_id, start_date, end_date,
                   guest_count, cost, status, created_at, updated_at
            FROM bookings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::booking_from_row(&row)).transpose()
    }

    async fn insert_booking(&self, new_booking: &NewBooking) -> Result<Booking, BookingError> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (
                spot_id, requester_id, start_date, end_date, guest_count, cost, status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, spot_id, requester_id, start_date, end_date,
                      guest_count, cost, status, created_at, updated_at
            "#,
        )
        .bind(new_booking.spot_id)
        .bind(new_booking.requester_id)
        .bind(new_booking.start_date)
        .bind(new_booking.end_date)
        .bind(new_booking.guest_count)
        .bind(new_booking.cost)
        .bind(new_booking.status.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Self::booking_from_row(&row),
            Err(err) => Err(self
                .map_write_conflict(
                    err,
                    &new_booking.spot_id,
                    &new_booking.requester_id,
                    new_booking.start_date,
                    new_booking.end_date,
                    None,
                )
                .await),
        }
    }

    async fn update_booking_status(
        &self,
        id: &Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, BookingError> {
        // Guarded write: no row comes back if the status moved under us
        let row = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, spot_id, requester_id, start_date, end_date,
                      guest_count, cost, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::booking_from_row(&row)).transpose()
    }

    async fn update_booking_dates(
        &self,
        id: &Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Booking, BookingError> {
        let current = self
            .get_booking(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET start_date = $2, end_date = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, spot_id, requester_id, start_date, end_date,
                      guest_count, cost, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Self::booking_from_row(&row),
            Err(err) => Err(self
                .map_write_conflict(
                    err,
                    &current.spot_id,
                    &current.requester_id,
                    start_date,
                    end_date,
                    Some(current.id),
                )
                .await),
        }
    }

    async fn delete_booking(&self, id: &Uuid) -> Result<bool, BookingError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_completable_bookings(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Booking>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT id, spot_id, requester_id, start_date, end_date,
                   guest_count, cost, status, created_at, updated_at
            FROM bookings
            WHERE status = 'confirmed' AND end_date < $1
            ORDER BY end_date
            "#,
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::booking_from_row).collect()
    }
}

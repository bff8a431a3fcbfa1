use booking_engine::BookingError;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::booking_types::BookingWithSpot;

/// Read-side queries for the booking lists shown to callers
pub struct BookingQueryService {
    pool: PgPool,
}

impl BookingQueryService {
    /// Creates a new instance of `BookingQueryService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets all bookings placed by the given requester, newest first
    pub async fn list_for_requester(
        &self,
        requester_id: &Uuid,
    ) -> Result<Vec<BookingWithSpot>, BookingError> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.spot_id, b.start_date, b.end_date, b.guest_count,
                   b.cost, b.status, b.created_at, s.name as spot_name
            FROM bookings b
            LEFT JOIN spots s ON b.spot_id = s.id
            WHERE b.requester_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        let bookings = rows
            .iter()
            .map(|row| BookingWithSpot {
                id: row.get("id"),
                spot_id: row.get("spot_id"),
                spot_name: row
                    .get::<Option<String>, _>("spot_name")
                    .unwrap_or_else(|| "Unknown Spot".to_string()),
                start_date: row.get("start_date"),
                end_date: row.get("end_date"),
                guest_count: row.get("guest_count"),
                cost: row.get("cost"),
                status: row.get("status"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(bookings)
    }
}

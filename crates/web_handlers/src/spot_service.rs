use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::spot_types::*;

/// Service for managing the spot catalog
pub struct SpotService {
    pool: PgPool,
}

impl SpotService {
    /// Creates a new instance of `SpotService` with the provided database connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a new spot owned by the given user
    pub async fn create_spot(
        &self,
        owner_id: &Uuid,
        request: &CreateSpotRequest,
    ) -> Result<Spot, SpotError> {
        let row = sqlx::query(
            r#"
            INSERT INTO spots (owner_id, name, description, location, price_per_night)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, name, description, location, price_per_night,
                      created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.location)
        .bind(request.price_per_night)
        .fetch_one(&self.pool)
        .await?;

        let spot = Spot {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            name: row.get("name"),
            description: row.get("description"),
            location: row.get("location"),
            price_per_night: row.get("price_per_night"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        };

        Ok(spot)
    }

    /// Gets a single spot by id
    pub async fn get_spot(&self, spot_id: &Uuid) -> Result<Spot, SpotError> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, name, description, location, price_per_night,
                   created_at, updated_at
            FROM spots
            WHERE id = $1
            "#,
        )
        .bind(spot_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Spot {
                id: row.get("id"),
                owner_id: row.get("owner_id"),
                name: row.get("name"),
                description: row.get("description"),
                location: row.get("location"),
                price_per_night: row.get("price_per_night"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            }),
            None => Err(SpotError::NotFound),
        }
    }

    /// Lists every spot in the catalog, newest first
    pub async fn list_spots(&self) -> Result<Vec<Spot>, SpotError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, description, location, price_per_night,
                   created_at, updated_at
            FROM spots
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let spots = rows
            .iter()
            .map(|row| Spot {
                id: row.get("id"),
                owner_id: row.get("owner_id"),
                name: row.get("name"),
                description: row.get("description"),
                location: row.get("location"),
                price_per_night: row.get("price_per_night"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect();

        Ok(spots)
    }
}

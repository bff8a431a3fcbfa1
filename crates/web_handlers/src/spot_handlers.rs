use actix_web::{HttpResponse, Result, web};
use validator::Validate;

use crate::spot_service::SpotService;
use crate::spot_types::*;
use auth_services::middleware::AuthenticatedUser;

/// Lists a new spot owned by the authenticated user
pub async fn create_spot(
    pool: web::Data<sqlx::PgPool>,
    user: AuthenticatedUser,
    request: web::Json<CreateSpotRequest>,
) -> Result<HttpResponse, SpotError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| SpotError::Validation(format!("Validation error: {}", e)))?;

    let spot_service = SpotService::new(pool.get_ref().clone());
    let spot = spot_service.create_spot(&user.id, &request).await?;

    Ok(HttpResponse::Created().json(spot))
}

/// Gets a single spot from the catalog
pub async fn get_spot(
    pool: web::Data<sqlx::PgPool>,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, SpotError> {
    let spot_id = path.into_inner();
    let spot_service = SpotService::new(pool.get_ref().clone());
    let spot = spot_service.get_spot(&spot_id).await?;

    Ok(HttpResponse::Ok().json(spot))
}

/// Lists every spot in the catalog
pub async fn list_spots(pool: web::Data<sqlx::PgPool>) -> Result<HttpResponse, SpotError> {
    let spot_service = SpotService::new(pool.get_ref().clone());
    let spots = spot_service.list_spots().await?;

    let response = ListSpotsResponse {
        total: spots.len() as i64,
        spots,
    };

    Ok(HttpResponse::Ok().json(response))
}

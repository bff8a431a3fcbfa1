use std::sync::Arc;

use actix_web::{HttpResponse, Result, web};
use uuid::Uuid;
use validator::Validate;

use auth_services::middleware::AuthenticatedUser;
use booking_engine::{
    BookingEngine, BookingError, BookingPolicy, CreateBlackoutRequest, CreateBookingRequest,
    UpdateBookingDatesRequest, cancellation_window_open,
};
use notification_services::NotificationService;
use postgres::booking_repository::PgBookingRepository;

use crate::booking_queries::BookingQueryService;
use crate::booking_types::*;
use crate::spot_service::SpotService;
use crate::spot_types::SpotError;

/// Builds a booking engine over the request's connection pool
pub(crate) fn booking_engine(
    pool: &web::Data<sqlx::PgPool>,
    policy: &web::Data<BookingPolicy>,
) -> BookingEngine {
    let repository = Arc::new(PgBookingRepository::new(pool.get_ref().clone()));
    BookingEngine::new(repository, Some(policy.get_ref().clone()))
}

/// Resolves the owner of a spot for authorization checks
pub(crate) async fn spot_owner_id(
    pool: &web::Data<sqlx::PgPool>,
    spot_id: &Uuid,
) -> Result<Uuid, BookingError> {
    let spot_service = SpotService::new(pool.get_ref().clone());

    match spot_service.get_spot(spot_id).await {
        Ok(spot) => Ok(spot.owner_id),
        Err(SpotError::Database(e)) => Err(BookingError::Database(e)),
        Err(_) => Err(BookingError::SpotNotFound),
    }
}

/// Resolves a spot's display name for notification emails
pub(crate) async fn spot_display_name(
    pool: &web::Data<sqlx::PgPool>,
    spot_id: &Uuid,
) -> String {
    let spot_service = SpotService::new(pool.get_ref().clone());

    match spot_service.get_spot(spot_id).await {
        Ok(spot) => spot.name,
        Err(_) => "your spot".to_string(),
    }
}

/// Creates a booking request for the authenticated user
pub async fn create_booking(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    request: web::Json<CreateBookingRequest>,
) -> Result<HttpResponse, BookingError> {
    // Validate the request
    request
        .validate()
        .map_err(|e| BookingError::from_validation(&e))?;

    let engine = booking_engine(&pool, &policy);
    let booking = engine.create_booking(&user.id, &request).await?;

    // Best-effort email; a failed send never fails the booking
    let spot_name = spot_display_name(&pool, &booking.spot_id).await;
    if let Err(e) = notifications
        .send_booking_received(
            &booking.id,
            &user.email,
            &spot_name,
            booking.start_date,
            booking.end_date,
        )
        .await
    {
        log::warn!("Failed to send booking-received email: {}", e);
    }

    Ok(HttpResponse::Created().json(booking))
}

/// Gets all bookings placed by the authenticated user
pub async fn list_my_bookings(
    pool: web::Data<sqlx::PgPool>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, BookingError> {
    let queries = BookingQueryService::new(pool.get_ref().clone());
    let bookings = queries.list_for_requester(&user.id).await?;

    let response = ListBookingsResponse {
        total: bookings.len() as i64,
        bookings,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Gets a single booking. Visible to the requester and the spot owner.
pub async fn get_booking(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let booking_id = path.into_inner();
    let engine = booking_engine(&pool, &policy);

    let booking = engine.get_booking(&booking_id).await?;

    if booking.requester_id != user.id && spot_owner_id(&pool, &booking.spot_id).await? != user.id
    {
        return Err(BookingError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(booking))
}

/// Cancels a booking. Allowed for the requester or the spot owner while the
/// stay has not yet ended.
pub async fn cancel_booking(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    notifications: web::Data<NotificationService>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, BookingError> {
    let booking_id = path.into_inner();
    let engine = booking_engine(&pool, &policy);

    let booking = engine.get_booking(&booking_id).await?;

    if booking.requester_id != user.id && spot_owner_id(&pool, &booking.spot_id).await? != user.id
    {
        return Err(BookingError::Unauthorized);
    }

    let today = chrono::Utc::now().date_naive();
    if !cancellation_window_open(&booking, today) {
        return Err(BookingError::Validation {
            field: "end_date".to_string(),
            message: "Bookings can no longer be cancelled after the stay has ended".to_string(),
        });
    }

    let cancelled = engine.cancel_booking(&booking_id).await?;

    // Best-effort email to the caller
    let spot_name = spot_display_name(&pool, &cancelled.spot_id).await;
    if let Err(e) = notifications
        .send_booking_cancelled(
            &cancelled.id,
            &user.email,
            &spot_name,
            cancelled.start_date,
            cancelled.end_date,
        )
        .await
    {
        log::warn!("Failed to send booking-cancelled email: {}", e);
    }

    Ok(HttpResponse::Ok().json(cancelled))
}

/// Moves a booking to new dates. Only the requester may reschedule.
pub async fn update_booking_dates(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<UpdateBookingDatesRequest>,
) -> Result<HttpResponse, BookingError> {
    let booking_id = path.into_inner();
    let engine = booking_engine(&pool, &policy);

    let booking = engine.get_booking(&booking_id).await?;
    if booking.requester_id != user.id {
        return Err(BookingError::Unauthorized);
    }

    let updated = engine.update_booking_dates(&booking_id, &request).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Checks whether a spot is free for a date range. Public endpoint.
pub async fn check_availability(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    path: web::Path<uuid::Uuid>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, BookingError> {
    let spot_id = path.into_inner();
    let engine = booking_engine(&pool, &policy);

    let available = engine
        .is_available(&spot_id, query.start_date, query.end_date, None)
        .await?;

    Ok(HttpResponse::Ok().json(AvailabilityResponse {
        spot_id,
        start_date: query.start_date,
        end_date: query.end_date,
        available,
    }))
}

/// Blocks a date range on a spot. Only the owner may create blackouts.
pub async fn create_blackout(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
    request: web::Json<CreateBlackoutRequest>,
) -> Result<HttpResponse, BookingError> {
    let spot_id = path.into_inner();

    if spot_owner_id(&pool, &spot_id).await? != user.id {
        return Err(BookingError::Unauthorized);
    }

    let engine = booking_engine(&pool, &policy);
    let blackout = engine.create_blackout(&user.id, &spot_id, &request).await?;

    Ok(HttpResponse::Created().json(blackout))
}

/// Removes a blackout from a spot, reopening the dates
pub async fn remove_blackout(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    user: AuthenticatedUser,
    path: web::Path<(uuid::Uuid, uuid::Uuid)>,
) -> Result<HttpResponse, BookingError> {
    let (spot_id, booking_id) = path.into_inner();

    if spot_owner_id(&pool, &spot_id).await? != user.id {
        return Err(BookingError::Unauthorized);
    }

    let engine = booking_engine(&pool, &policy);

    // The blackout must belong to the spot in the path
    let booking = engine.get_booking(&booking_id).await?;
    if booking.spot_id != spot_id {
        return Err(BookingError::NotFound);
    }

    engine.remove_blackout(&booking_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

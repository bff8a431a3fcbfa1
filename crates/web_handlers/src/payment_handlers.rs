use actix_web::{HttpRequest, HttpResponse, Result, web};

use auth_services::middleware::AuthenticatedUser;
use booking_engine::{BookingError, BookingPolicy, BookingStatus};
use notification_services::NotificationService;
use payments::{PaymentClient, SIGNATURE_HEADER, parse_event};

use crate::booking_handlers::{booking_engine, spot_display_name};
use crate::booking_types::CheckoutResponse;

/// Opens a checkout session for a pending booking. Only the requester may pay.
pub async fn create_checkout(
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    payment_client: web::Data<PaymentClient>,
    user: AuthenticatedUser,
    path: web::Path<uuid::Uuid>,
) -> Result<HttpResponse, actix_web::Error> {
    let booking_id = path.into_inner();
    let engine = booking_engine(&pool, &policy);

    let booking = engine.get_booking(&booking_id).await?;

    if booking.requester_id != user.id {
        return Err(BookingError::Unauthorized.into());
    }

    // Only pending bookings take payment; anything else has already moved on
    if booking.status != BookingStatus::Pending {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: BookingStatus::Confirmed,
        }
        .into());
    }

    let cost = booking.cost.ok_or_else(|| BookingError::Validation {
        field: "cost".to_string(),
        message: "Booking has no cost to collect".to_string(),
    })?;

    let spot_name = spot_display_name(&pool, &booking.spot_id).await;
    let description = format!("CampMate stay at {}", spot_name);

    let session = payment_client
        .create_checkout_session(&booking.id, &user.email, cost, &description)
        .await?;

    Ok(HttpResponse::Created().json(CheckoutResponse {
        session_id: session.id,
        checkout_url: session.url,
    }))
}

/// Receives payment provider webhooks and settles booking state
pub async fn payment_webhook(
    req: HttpRequest,
    pool: web::Data<sqlx::PgPool>,
    policy: web::Data<BookingPolicy>,
    payment_client: web::Data<PaymentClient>,
    notifications: web::Data<NotificationService>,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    payment_client.verify_webhook(signature, &body)?;

    let event = parse_event(&body)?;
    let engine = booking_engine(&pool, &policy);

    match event.event_type.as_str() {
        "payment.succeeded" => match engine.confirm_booking(&event.data.booking_id).await {
            Ok(booking) => {
                log::info!("💳 Payment settled for booking {}", booking.id);

                // Best-effort email; a failed send never fails the webhook
                if let Some(email) = &event.data.requester_email {
                    let spot_name = spot_display_name(&pool, &booking.spot_id).await;
                    if let Err(e) = notifications
                        .send_booking_confirmed(
                            &booking.id,
                            email,
                            &spot_name,
                            booking.start_date,
                            booking.end_date,
                        )
                        .await
                    {
                        log::warn!("Failed to send booking-confirmed email: {}", e);
                    }
                }
            }
            Err(BookingError::InvalidTransition {
                from: BookingStatus::Confirmed,
                ..
            }) => {
                // Providers redeliver webhooks; a confirmed booking means we
                // already handled this one
                log::info!(
                    "Ignoring replayed payment webhook for booking {}",
                    event.data.booking_id
                );
            }
            Err(e) => return Err(e.into()),
        },
        "checkout.expired" => {
            match engine.expire_pending_booking(&event.data.booking_id).await? {
                Some(booking) => {
                    log::info!("Checkout expired, released booking {}", booking.id)
                }
                None => {
                    log::debug!(
                        "Checkout expired for booking {} but it is no longer pending",
                        event.data.booking_id
                    )
                }
            }
        }
        other => {
            log::debug!("Ignoring unhandled webhook event type: {}", other);
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "received": true })))
}

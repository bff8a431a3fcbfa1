//! Main entry point for the CampMate booking backend.
//! This crate wires up the REST API, payment webhooks, and background jobs.

mod booking_sweep;

use std::sync::Arc;

use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use auth_services::middleware::AuthMiddleware;
use booking_engine::BookingPolicy;
use notification_services::NotificationService;
use payments::PaymentClient;
use postgres::database::*;
use web_handlers::*;

use crate::booking_sweep::{BookingSweep, SweepConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🏕️ Starting CampMate booking server...");

    // Create database connection pool
    let pool = match create_connection_pool().await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running: brew services start postgresql@16");
            std::process::exit(1);
        }
    };

    // Apply pending migrations
    if let Err(e) = run_migrations(&pool).await {
        log::error!("❌ Database migration failed: {}", e);
        std::process::exit(1);
    }
    log::info!("🗃️ Database schema is up to date");

    // Create notification service
    let notification_service = NotificationService::new().await;
    log::info!("📧 Notification service initialized");

    // Create payment client
    let payment_client = match PaymentClient::from_env() {
        Ok(client) => {
            log::info!("💳 Payment client initialized");
            client
        }
        Err(e) => {
            log::error!("❌ Failed to initialize payment client: {}", e);
            log::error!("💡 Set PAYMENTS_API_KEY and PAYMENTS_WEBHOOK_SECRET");
            std::process::exit(1);
        }
    };

    let booking_policy = BookingPolicy::from_env();

    // Health checks stay exempt so load balancers are never throttled
    let rate_limit_config = RateLimitConfig {
        skip: Some(|req| req.path() == "/health"),
        ..RateLimitConfig::from_env()
    };
    // One counter store shared across all workers
    let counter_store: Arc<dyn CounterStore> = Arc::new(InMemoryCounterStore::new());

    // Start the completion sweep
    let mut sweep = BookingSweep::new(pool.clone());
    sweep.start(booking_policy.clone(), SweepConfig::from_env());

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    log::info!("🚀 Server will be available at: http://{}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(payment_client.clone()))
            .app_data(web::Data::new(booking_policy.clone()))
            .wrap(RateLimitMiddleware::with_store(
                rate_limit_config.clone(),
                counter_store.clone(),
            ))
            .wrap(Logger::default())
            .service(
                web::scope("/api")
                    // Public routes
                    .service(
                        web::scope("/spots")
                            .route("", web::get().to(list_spots))
                            .route("/{spot_id}", web::get().to(get_spot))
                            .route("/{spot_id}/availability", web::get().to(check_availability)),
                    )
                    // Owner routes (require authentication)
                    .service(
                        web::scope("/manage")
                            .wrap(AuthMiddleware)
                            .route("/spots", web::post().to(create_spot))
                            .route("/spots/{spot_id}/blackouts", web::post().to(create_blackout))
                            .route(
                                "/spots/{spot_id}/blackouts/{booking_id}",
                                web::delete().to(remove_blackout),
                            ),
                    )
                    // Booking routes (require authentication)
                    .service(
                        web::scope("/bookings")
                            .wrap(AuthMiddleware)
                            .route("", web::post().to(create_booking))
                            .route("", web::get().to(list_my_bookings))
                            .route("/{booking_id}", web::get().to(get_booking))
                            .route("/{booking_id}/dates", web::put().to(update_booking_dates))
                            .route("/{booking_id}/cancel", web::post().to(cancel_booking))
                            .route("/{booking_id}/checkout", web::post().to(create_checkout)),
                    )
                    // Payment provider callbacks (signature-verified, no login)
                    .service(
                        web::scope("/payments")
                            .route("/webhook", web::post().to(payment_webhook)),
                    ),
            )
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("OK") }),
            )
    })
    .bind(&bind_addr)?
    .run()
    .await
}

use std::{sync::Arc, time::Duration};

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use booking_engine::{BookingEngine, BookingPolicy};
use postgres::booking_repository::PgBookingRepository;

/// Configuration for the booking completion sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between sweep passes
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

impl SweepConfig {
    /// Builds a config from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let interval_secs = std::env::var("SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .unwrap_or(3600);

        Self {
            interval: Duration::from_secs(interval_secs),
        }
    }
}

/// Background task that moves elapsed confirmed bookings to completed.
/// Integrates with the web server to keep booking state current without
/// any request traffic.
pub struct BookingSweep {
    pool: PgPool,
    handle: Option<JoinHandle<()>>,
}

impl BookingSweep {
    /// Create a new sweep over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool, handle: None }
    }

    /// Start the periodic sweep in a background task
    pub fn start(&mut self, policy: BookingPolicy, config: SweepConfig) {
        info!(
            "Starting booking completion sweep (every {:?})",
            config.interval
        );

        let pool = self.pool.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);

            // The first tick fires immediately, catching rows left over
            // from downtime
            loop {
                ticker.tick().await;

                let repository = Arc::new(PgBookingRepository::new(pool.clone()));
                let engine = BookingEngine::new(repository, Some(policy.clone()));
                let today = chrono::Utc::now().date_naive();

                match engine.complete_elapsed_bookings(today).await {
                    Ok(0) => debug!("Completion sweep found nothing to do"),
                    Ok(count) => info!("Completion sweep closed {} booking(s)", count),
                    Err(e) => error!("Completion sweep failed: {}", e),
                }
            }
        });

        self.handle = Some(handle);
    }

    /// Stop the sweep task
    pub async fn stop(&mut self) {
        info!("Stopping booking completion sweep");

        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for BookingSweep {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

//! # Web Handlers for the CampMate Booking API
//!
//! This crate provides the web handlers for the CampMate application.

/// Spot catalog types and errors
mod spot_types;
pub use spot_types::*;

/// Spot catalog persistence
mod spot_service;
pub use spot_service::*;

/// Spot catalog handlers (create/get/list)
mod spot_handlers;
pub use spot_handlers::*;

/// Booking read-model types returned to clients
mod booking_types;
pub use booking_types::*;

/// Booking list queries joined with spot data
mod booking_queries;
pub use booking_queries::*;

/// Booking lifecycle handlers
mod booking_handlers;
pub use booking_handlers::*;

/// Checkout and payment webhook handlers
mod payment_handlers;
pub use payment_handlers::*;

/// Request rate limiting middleware
mod rate_limit;
pub use rate_limit::*;

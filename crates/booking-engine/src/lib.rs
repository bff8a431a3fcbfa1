//! # Booking Engine
//!
//! This crate provides the availability and lifecycle rules for camping spot
//! bookings. It decides whether a requested date range can be accepted given
//! the existing reservations for a spot, and which status transitions a
//! booking may go through.

/// Types for booking operations
mod booking_types;
pub use booking_types::*;

/// Date range overlap and booking window predicates
mod availability;
pub use availability::*;

/// Storage interface consumed by the engine
mod repository;
pub use repository::*;

/// In-memory repository for development and testing
mod memory;
pub use memory::*;

/// Booking creation and lifecycle workflows
mod engine;
pub use engine::*;

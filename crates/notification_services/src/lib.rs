//! # Notification Services
//!
//! This crate provides booking lifecycle emails for the CampMate application.
//! Messages are delivered through AWS SES and are always best-effort.

/// Service definitions for booking notification delivery.
pub mod service;
/// Types and structures used in notification services.
pub mod types;

pub use service::NotificationService;
pub use types::NotificationError;

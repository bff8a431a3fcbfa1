//! # Payments
//!
//! This crate integrates the CampMate API with the hosted-checkout payment
//! provider. It creates checkout sessions for pending bookings and verifies
//! the signed webhooks the provider sends back when a payment settles.

/// Checkout session client for the payment provider API.
pub mod checkout;
/// Types and structures used for payment operations.
pub mod types;
/// Webhook signature verification and event parsing.
pub mod webhook;

pub use checkout::{CheckoutSession, PaymentClient};
pub use types::PaymentError;
pub use webhook::{SIGNATURE_HEADER, WebhookEvent, parse_event};

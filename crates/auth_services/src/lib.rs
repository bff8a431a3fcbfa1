//! # Auth Services
//!
//! This crate provides request authentication for the CampMate API.
//! It includes JWT token handling and the middleware that resolves the
//! calling user on protected routes.

/// JWT token signing and verification.
pub mod jwt;
/// Middleware for request authentication and the authenticated-user extractor.
pub mod middleware;
/// Types and structures used in authentication services.
pub mod types;

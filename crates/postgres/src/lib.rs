//! # Postgres
//!
//! This crate provides the PostgreSQL persistence layer for the CampMate booking service.

/// PostgreSQL-backed booking repository.
pub mod booking_repository;

/// Database client for the booking service.
pub mod database;

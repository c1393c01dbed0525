//! Customer Address Atomic Microservice.
//!
//! Atomic service for managing postal addresses: each address is keyed by
//! a server-generated `address_id` (UUID) and linked to its owning
//! customer by `university_id`. State lives in SQLite via SQLx; the HTTP
//! surface is an Axum JSON API built by [`handlers::router`].

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;

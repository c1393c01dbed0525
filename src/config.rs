//! Configuration module for the address service
//!
//! Loads from environment variables:
//! - DATABASE_URL: SQLite connection string (default: "sqlite:./addresses.db?mode=rwc")
//! - HOST: Bind address (default: "0.0.0.0")
//! - PORT: Server port (default: 8080)
//!
//! PORT is the variable container platforms inject at deploy time; an
//! unparsable value falls back to the default rather than aborting startup.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            // mode=rwc: a fresh deployment starts with an empty database
            // file instead of failing to open a missing one
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./addresses.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

//! # userhub Config
//!
//! Configuration types for the userhub API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`web`]: Listener address, request deadline, shutdown grace period, CORS
//! - [`auth`]: Signing key folder, active key id, issuer, token lifetime
//! - [`database`]: PostgreSQL connection settings
//!
//! Every section has a `from_env()` constructor that applies defaults for unset
//! variables and rejects values that do not parse. `from_lookup()` takes the
//! variable source as a closure so tests never touch the process environment.
//!
//! # Example
//!
//! ```ignore
//! use userhub_config::{AuthConfig, DatabaseConfig, WebConfig};
//!
//! dotenvy::dotenv().ok();
//! let web = WebConfig::from_env()?;
//! let auth = AuthConfig::from_env()?;
//! let database = DatabaseConfig::from_env()?;
//! ```

pub mod auth;
pub mod database;
pub mod web;

use std::str::FromStr;

// Re-export commonly used types at crate root
pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use web::WebConfig;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Reads `name` through `lookup`, falling back to `default` when unset.
pub(crate) fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

pub(crate) fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

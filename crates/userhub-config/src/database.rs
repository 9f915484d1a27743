//! Database connection configuration.
//!
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_OPEN_CONNS`: Pool size ceiling (default: 10)
//! - `DB_MAX_IDLE_CONNS`: Connections kept open while idle (default: 2)

use crate::{ConfigError, env_lookup, parse_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let max_open_conns = parse_or(&lookup, "DB_MAX_OPEN_CONNS", 10)?;
        let max_idle_conns = parse_or(&lookup, "DB_MAX_IDLE_CONNS", 2)?;

        Ok(Self {
            url,
            max_open_conns,
            // More idle than open connections is meaningless for the pool.
            max_idle_conns: max_idle_conns.min(max_open_conns),
        })
    }
}

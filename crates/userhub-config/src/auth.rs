//! Token signing configuration.
//!
//! - `AUTH_KEYS_FOLDER`: Directory holding `<kid>.pem` / `<kid>.pub.pem` files (default: `resources/keys/`)
//! - `AUTH_ACTIVE_KID`: Key id used to sign new tokens
//! - `AUTH_ISSUER`: `iss` claim written and required (default: `service project`)
//! - `AUTH_TOKEN_TTL`: Token lifetime in seconds (default: one year)

use std::path::PathBuf;
use std::time::Duration;

use crate::{ConfigError, env_lookup, parse_or};

pub const DEFAULT_ACTIVE_KID: &str = "54bb2165-71e1-41a6-af3e-7da4a0e1e2c1";
pub const DEFAULT_ISSUER: &str = "service project";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub keys_folder: PathBuf,
    pub active_kid: String,
    pub issuer: String,
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            keys_folder: PathBuf::from("resources/keys/"),
            active_kid: DEFAULT_ACTIVE_KID.to_string(),
            issuer: DEFAULT_ISSUER.to_string(),
            token_ttl: Duration::from_secs(8760 * 60 * 60),
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let token_ttl = parse_or(&lookup, "AUTH_TOKEN_TTL", defaults.token_ttl.as_secs())?;
        if token_ttl == 0 {
            return Err(ConfigError::Invalid {
                name: "AUTH_TOKEN_TTL",
                value: token_ttl.to_string(),
            });
        }

        Ok(Self {
            keys_folder: lookup("AUTH_KEYS_FOLDER")
                .map(PathBuf::from)
                .unwrap_or(defaults.keys_folder),
            active_kid: lookup("AUTH_ACTIVE_KID").unwrap_or(defaults.active_kid),
            issuer: lookup("AUTH_ISSUER").unwrap_or(defaults.issuer),
            token_ttl: Duration::from_secs(token_ttl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let config = AuthConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.issuer, "service project");
        assert_eq!(config.active_kid, DEFAULT_ACTIVE_KID);
        assert_eq!(config.token_ttl, Duration::from_secs(31_536_000));
        assert_eq!(config.keys_folder, PathBuf::from("resources/keys/"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = AuthConfig::from_lookup(|name| {
            (name == "AUTH_TOKEN_TTL").then(|| "0".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "AUTH_TOKEN_TTL", .. }));
    }
}

//! HTTP listener configuration.
//!
//! - `API_HOST`: Address to bind (default: `0.0.0.0:3000`)
//! - `WEB_REQUEST_TIMEOUT`: Per-request deadline in seconds (default: 10)
//! - `WEB_SHUTDOWN_TIMEOUT`: Grace period for in-flight requests on shutdown, in seconds (default: 20)
//! - `CORS_ALLOWED_ORIGINS`: Comma separated list of allowed origins

use std::time::Duration;

use crate::{ConfigError, env_lookup, parse_or};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WebConfig {
    pub api_host: String,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0:3000".to_string(),
            request_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(20),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl WebConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let allowed_origins = match lookup("CORS_ALLOWED_ORIGINS") {
            Some(origins) => origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.allowed_origins,
        };

        Ok(Self {
            api_host: lookup("API_HOST").unwrap_or(defaults.api_host),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "WEB_REQUEST_TIMEOUT",
                defaults.request_timeout.as_secs(),
            )?),
            shutdown_timeout: Duration::from_secs(parse_or(
                &lookup,
                "WEB_SHUTDOWN_TIMEOUT",
                defaults.shutdown_timeout.as_secs(),
            )?),
            allowed_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = WebConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WebConfig::default());
        assert_eq!(config.api_host, "0.0.0.0:3000");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(20));
    }

    #[test]
    fn reads_overrides() {
        let config = WebConfig::from_lookup(lookup(&[
            ("API_HOST", "127.0.0.1:8080"),
            ("WEB_REQUEST_TIMEOUT", "3"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ]))
        .unwrap();

        assert_eq!(config.api_host, "127.0.0.1:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = WebConfig::from_lookup(lookup(&[("WEB_SHUTDOWN_TIMEOUT", "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "WEB_SHUTDOWN_TIMEOUT",
                value: "soon".to_string()
            }
        );
    }
}

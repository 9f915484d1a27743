//! RS256 token signing and verification.
//!
//! The [`Authenticator`] signs with the private half of the active key and
//! verifies with whichever public key the token's `kid` header names.
//!
//! # Verification
//!
//! A token is accepted only if all of the following hold:
//!
//! - The header names the RS256 algorithm and carries a `kid`
//! - The `kid` resolves to a public key in the store
//! - The signature verifies against that key
//! - `iss` matches the configured issuer
//! - `now < exp`, with no leeway
//! - `sub` is non-empty
//!
//! Every failure surfaces as [`AuthError::InvalidToken`]; the concrete reason is
//! logged at debug level only.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, Header, Validation, decode, decode_header, encode};
use tracing::debug;
use userhub_config::AuthConfig;

use crate::claims::Claims;
use crate::error::AuthError;
use crate::keystore::KeyLookup;

#[derive(Clone)]
pub struct Authenticator {
    keys: Arc<dyn KeyLookup>,
    active_kid: String,
    issuer: String,
    token_ttl: Duration,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("active_kid", &self.active_kid)
            .field("issuer", &self.issuer)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Authenticator {
    /// Builds an authenticator, checking up front that the active key can sign.
    pub fn new(keys: Arc<dyn KeyLookup>, config: &AuthConfig) -> Result<Self, AuthError> {
        keys.private_key(&config.active_kid)?;

        Ok(Self {
            keys,
            active_kid: config.active_kid.clone(),
            issuer: config.issuer.clone(),
            token_ttl: config.token_ttl,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn active_kid(&self) -> &str {
        &self.active_kid
    }

    /// Claims for `subject`, issued at `now` (Unix seconds).
    pub fn issue_claims(&self, subject: impl Into<String>, roles: Vec<String>, now: u64) -> Claims {
        Claims::new(self.issuer.clone(), subject, roles, now, self.token_ttl)
    }

    /// Signs `claims` with the active key.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        let key = self.keys.private_key(&self.active_kid)?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.active_kid.clone());

        encode(&header, claims, key).map_err(AuthError::Signing)
    }

    /// Verifies `token` against the current time.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, now_unix())
    }

    /// Verifies `token` as of `now` (Unix seconds).
    pub fn validate_token_at(&self, token: &str, now: u64) -> Result<Claims, AuthError> {
        self.verify(token, now).map_err(|reason| {
            debug!(reason = %reason, "token rejected");
            AuthError::InvalidToken
        })
    }

    fn verify(&self, token: &str, now: u64) -> Result<Claims, String> {
        let header = decode_header(token).map_err(|e| format!("malformed header: {}", e))?;
        if header.alg != Algorithm::RS256 {
            return Err(format!("unexpected algorithm {:?}", header.alg));
        }
        let kid = header.kid.ok_or_else(|| "missing kid".to_string())?;
        let key = self.keys.public_key(&kid).map_err(|e| e.to_string())?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        // Expiry is checked below against the caller's clock.
        validation.validate_exp = false;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, key, &validation)
            .map_err(|e| format!("verification failed: {}", e))?
            .claims;

        if claims.exp <= now {
            return Err(format!("expired at {}", claims.exp));
        }
        if claims.exp <= claims.iat {
            return Err("expiry precedes issue time".to_string());
        }
        if claims.sub.is_empty() {
            return Err("empty subject".to_string());
        }

        Ok(claims)
    }
}

pub fn now_unix() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

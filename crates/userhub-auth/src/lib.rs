//! # userhub Auth
//!
//! Authentication types and RS256 token utilities for the userhub API.
//!
//! This crate provides:
//!
//! - [`claims`]: The claims carried by every token and the role check
//! - [`keystore`]: Key id to RSA key resolution, loaded from PEM files
//! - [`jwt`]: The [`Authenticator`] that signs and verifies tokens
//! - [`gate`]: The owner-or-admin rule applied to single-user operations
//!
//! # Key Rotation
//!
//! Tokens carry the id of the key that signed them in the `kid` header. The
//! key store may hold public keys without a private half, so tokens signed by a
//! rotated-out key keep verifying until they expire while new tokens are
//! signed with the active key only.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use userhub_auth::{Authenticator, KeyStore};
//! use userhub_config::AuthConfig;
//!
//! let config = AuthConfig::from_env()?;
//! let keys = KeyStore::from_dir(&config.keys_folder)?;
//! let auth = Authenticator::new(Arc::new(keys), &config)?;
//!
//! let claims = auth.issue_claims(user_id.to_string(), vec!["user".into()], now);
//! let token = auth.generate_token(&claims)?;
//! let verified = auth.validate_token(&token)?;
//! assert_eq!(verified, claims);
//! ```

pub mod claims;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod keystore;

#[cfg(any(test, feature = "test-utils"))]
pub mod testutil;

// Re-export commonly used types at crate root
pub use claims::{Claims, roles};
pub use error::AuthError;
pub use gate::owner_or_admin;
pub use jwt::Authenticator;
pub use keystore::{KeyLookup, KeyStore};

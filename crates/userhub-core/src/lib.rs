//! # userhub Core
//!
//! Core types, errors, and utilities for the userhub API.
//!
//! This crate provides the foundational types every other crate builds on:
//!
//! - [`errors`]: The error taxonomy ([`AppError`]) and its HTTP mapping
//! - [`password`]: bcrypt password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use userhub_core::errors::{AppError, StoreError};
//! use userhub_core::password::{hash_password, verify_password};
//!
//! // Domain failures map onto a single response kind
//! let err = AppError::from(StoreError::NotFound);
//! assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod password;

// Re-export commonly used types at crate root
pub use errors::{AppError, FieldError, FieldErrors, RequestError, ShutdownError, StoreError};
pub use password::{hash_password, verify_password};

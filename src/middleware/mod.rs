//! Middleware for the request pipeline.
//!
//! Every middleware here is a [`Middleware`](crate::web::Middleware): a function
//! from the next [`Handler`](crate::web::Handler) to a new one. They are composed
//! when a route is registered, not per request.
//!
//! # Modules
//!
//! - [`logger`]: Request start/completion logging inside a per-request span
//! - [`panics`]: Turns a panic in any inner step into an error
//! - [`errors`]: The single place errors become responses
//! - [`metrics`]: Request and error counters
//! - [`auth`]: Bearer token authentication
//! - [`role`]: Role-based authorization
//!
//! # Standard Chain
//!
//! ```text
//! logger → panics → errors → metrics → [authenticate → authorize] → handler
//! ```
//!
//! The first four wrap every route; authentication and authorization are
//! registered per route.
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::{auth::authenticate, role::authorize};
//! use userhub_auth::roles;
//!
//! app.handle(
//!     MethodFilter::GET,
//!     "v1",
//!     "/users",
//!     handler(controller::query),
//!     &[authenticate(authenticator.clone()), authorize(&[roles::ADMIN])],
//! );
//! ```

pub mod auth;
pub mod errors;
pub mod logger;
pub mod metrics;
pub mod panics;
pub mod role;

use crate::web::Middleware;

/// App-wide middleware in the order they wrap every route.
pub fn standard() -> Vec<Middleware> {
    vec![
        logger::logger(),
        panics::panics(),
        errors::errors(),
        metrics::metrics(),
    ]
}

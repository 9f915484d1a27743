//! # userhub Models
//!
//! Domain models and DTOs for the userhub API.
//!
//! # Modules
//!
//! - [`users`]: The user entity, its database row, and request/response DTOs
//! - [`auth`]: Token endpoint response
//!
//! # Example
//!
//! ```ignore
//! use userhub_models::users::{NewUser, User, UserView};
//!
//! let view = UserView::from(&user);
//! println!("{}", serde_json::to_string(&view)?);
//! ```

pub mod auth;
pub mod users;

// Re-export commonly used types at crate root for convenience
pub use auth::TokenResponse;
pub use users::{NewUser, UpdateUser, User, UserRow, UserView};

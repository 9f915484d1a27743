//! Token claims and the role check.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Role names understood by the service.
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// Claims carried by every token.
///
/// # Fields
///
/// - `iss`: Service that issued the token
/// - `sub`: User ID (subject)
/// - `iat`: Issued-at, Unix seconds
/// - `exp`: Expiry, Unix seconds; always later than `iat`
/// - `roles`: Role names granted to the subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub roles: Vec<String>,
}

impl Claims {
    pub fn new(
        issuer: impl Into<String>,
        subject: impl Into<String>,
        roles: Vec<String>,
        now: u64,
        ttl: Duration,
    ) -> Self {
        Self {
            iss: issuer.into(),
            sub: subject.into(),
            iat: now,
            exp: now.saturating_add(ttl.as_secs().max(1)),
            roles,
        }
    }

    /// Returns true if the claims hold at least one of `required`.
    ///
    /// An empty `required` list never authorizes anything.
    pub fn authorized(&self, required: &[&str]) -> bool {
        required.iter().any(|role| self.has_role(role))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(roles::ADMIN)
    }
}

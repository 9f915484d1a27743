//! Owner-or-admin gate for single-user operations.

use tracing::warn;
use userhub_core::StoreError;

use crate::claims::{Claims, roles};

/// Grants access when the caller is an admin or is the user being acted on.
pub fn owner_or_admin(claims: &Claims, owner_id: &str) -> Result<(), StoreError> {
    if claims.authorized(&[roles::ADMIN]) || claims.sub == owner_id {
        return Ok(());
    }

    warn!(subject = %claims.sub, owner = %owner_id, "forbidden access to another user");
    Err(StoreError::Forbidden)
}

//! Password hashing and verification.
//!
//! Uses bcrypt with a per-hash random salt. The blocking variants are for the
//! CLI and tests; request handlers use the `_blocking` wrappers, which move the
//! work onto tokio's blocking pool so a slow hash never stalls the runtime.

use anyhow::Context;
use bcrypt::{hash, verify};

pub use bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts. Only suitable for tests.
pub const MIN_COST: u32 = 4;

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    hash_password_with_cost(password, DEFAULT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> anyhow::Result<String> {
    hash(password, cost).context("failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    verify(password, hash).context("failed to verify password")
}

/// Hashes on the blocking pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password_with_cost(&password, cost))
        .await
        .context("password hashing task failed")?
}

/// Verifies on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("password verification task failed")?
}

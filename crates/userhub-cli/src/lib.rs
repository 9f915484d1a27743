//! # userhub CLI
//!
//! Administrative commands that operate on the user store directly, without
//! going through the HTTP API:
//!
//! - `useradd`: create a user (the bootstrap path for the first admin)
//! - `users`: print every user as JSON
//! - `gentoken`: sign a token for an existing user with the configured keys
//!
//! The command bodies live here, over the [`UserRepository`] trait, so they can
//! be exercised against the in-memory repository.

use anyhow::{Context as _, anyhow};
use chrono::{DateTime, Utc};
use userhub_auth::{Authenticator, roles};
use userhub_core::FieldErrors;
use userhub_core::password::hash_password_blocking;
use userhub_db::UserRepository;
use userhub_models::{NewUser, User, UserView};
use uuid::Uuid;
use validator::Validate;

/// Roles granted by `useradd` when none are given.
pub const DEFAULT_ROLES: [&str; 2] = [roles::ADMIN, roles::USER];

pub async fn user_add(
    repo: &dyn UserRepository,
    name: String,
    email: String,
    password: String,
    roles: Vec<String>,
    hash_cost: u32,
    now: DateTime<Utc>,
) -> anyhow::Result<User> {
    let new_user = NewUser {
        name,
        email,
        roles,
        password_confirm: password.clone(),
        password,
    };
    new_user
        .validate()
        .map_err(|errs| anyhow!("invalid user: {}", FieldErrors::from(errs)))?;

    let hash = hash_password_blocking(new_user.password.clone(), hash_cost)
        .await
        .context("hashing password")?;
    let user = User::create(new_user, hash, Uuid::new_v4(), now);

    repo.create(&user).await.context("create user")?;
    Ok(user)
}

/// Every user as pretty-printed JSON, password hashes omitted.
pub async fn users_json(repo: &dyn UserRepository) -> anyhow::Result<String> {
    let users = repo.query_all().await.context("query users")?;
    let views: Vec<UserView> = users.iter().map(UserView::from).collect();

    serde_json::to_string_pretty(&views).context("encoding users")
}

/// Signs a token for `user_id`. The user's stored roles are used unless
/// `roles` overrides them.
pub async fn gen_token(
    repo: &dyn UserRepository,
    auth: &Authenticator,
    user_id: &str,
    roles: Option<Vec<String>>,
    now: u64,
) -> anyhow::Result<String> {
    let id = Uuid::parse_str(user_id).with_context(|| format!("parsing user id {:?}", user_id))?;
    let user = repo
        .query_by_id(id)
        .await
        .with_context(|| format!("query userID[{}]", id))?;

    let claims = auth.issue_claims(user.id.to_string(), roles.unwrap_or(user.roles), now);
    auth.generate_token(&claims).context("signing token")
}

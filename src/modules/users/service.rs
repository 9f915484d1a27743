//! Business API for users. Today it only wraps the store with context for
//! the error chain; cross-cutting concerns such as auditing belong here.

use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use userhub_auth::{Authenticator, Claims};
use userhub_models::{NewUser, UpdateUser, User};

use crate::modules::users::store::UserStore;
use crate::web::Context;

#[derive(Clone)]
pub struct UserCore {
    store: UserStore,
    auth: Arc<Authenticator>,
}

impl UserCore {
    pub fn new(store: UserStore, auth: Arc<Authenticator>) -> Self {
        Self { store, auth }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub async fn create(&self, ctx: &Context, nu: NewUser, now: DateTime<Utc>) -> anyhow::Result<User> {
        self.store.create(ctx, nu, now).await.context("create")
    }

    pub async fn update(
        &self,
        ctx: &Context,
        claims: &Claims,
        user_id: &str,
        uu: UpdateUser,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        self.store
            .update(ctx, claims, user_id, uu, now)
            .await
            .with_context(|| format!("update userID[{}]", user_id))
    }

    pub async fn delete(&self, ctx: &Context, claims: &Claims, user_id: &str) -> anyhow::Result<()> {
        self.store
            .delete(ctx, claims, user_id)
            .await
            .with_context(|| format!("delete userID[{}]", user_id))
    }

    pub async fn query_all(&self, ctx: &Context) -> anyhow::Result<Vec<User>> {
        self.store.query_all(ctx).await.context("query")
    }

    pub async fn query_by_id(&self, ctx: &Context, claims: &Claims, user_id: &str) -> anyhow::Result<User> {
        self.store
            .query_by_id(ctx, claims, user_id)
            .await
            .with_context(|| format!("query userID[{}]", user_id))
    }

    pub async fn query_by_email(&self, ctx: &Context, claims: &Claims, email: &str) -> anyhow::Result<User> {
        self.store
            .query_by_email(ctx, claims, email)
            .await
            .with_context(|| format!("query email[{:?}]", email))
    }

    /// Checks the credentials and returns claims for the user, issued at `now`.
    pub async fn authenticate(
        &self,
        ctx: &Context,
        now: DateTime<Utc>,
        email: &str,
        password: &str,
    ) -> anyhow::Result<Claims> {
        let user = self
            .store
            .authenticate(ctx, email, password)
            .await
            .context("authenticate")?;

        Ok(self
            .auth
            .issue_claims(user.id.to_string(), user.roles, now.timestamp().max(0) as u64))
    }

    pub fn generate_token(&self, claims: &Claims) -> anyhow::Result<String> {
        self.auth.generate_token(claims).context("generating token")
    }
}

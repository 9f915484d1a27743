//! User store: the gatekeeper between the business layer and the repository.
//!
//! Every single-user read, update and delete passes the owner-or-admin gate
//! here, before the repository is consulted, so a non-admin learns nothing
//! about users other than themselves. Repository calls and bcrypt work honor
//! the request deadline carried by the [`Context`].

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{error, instrument, warn};
use userhub_auth::{Claims, owner_or_admin};
use userhub_core::StoreError;
use userhub_core::password::{DEFAULT_COST, hash_password_blocking, verify_password_blocking};
use userhub_db::UserRepository;
use userhub_models::{NewUser, UpdateUser, User};
use uuid::Uuid;

use crate::web::Context;

/// Password checked against the dummy hash when a login names no user.
const DUMMY_PASSWORD: &str = "userhub-dummy-password";

#[derive(Clone)]
pub struct UserStore {
    repo: Arc<dyn UserRepository>,
    hash_cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

/// Parses a user id, rejecting anything that is not a UUID.
pub fn check_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|_| StoreError::InvalidId)
}

/// Runs `fut`, abandoning it if the context deadline passes first.
async fn within<T, F>(ctx: &Context, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match ctx.deadline() {
        Some(deadline) => tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| StoreError::DeadlineExceeded)?,
        None => fut.await,
    }
}

impl UserStore {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
            hash_cost: DEFAULT_COST,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Overrides the bcrypt cost used for new hashes.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self.dummy_hash = Arc::new(OnceCell::new());
        self
    }

    async fn hash(&self, ctx: &Context, password: String) -> Result<String, StoreError> {
        within(ctx, async {
            hash_password_blocking(password, self.hash_cost)
                .await
                .map_err(StoreError::Hashing)
        })
        .await
    }

    /// A hash at the store's cost, computed once, so logins for unknown
    /// emails pay for a full bcrypt verify like known ones.
    async fn dummy_hash(&self, ctx: &Context) -> Result<String, StoreError> {
        within(ctx, async {
            self.dummy_hash
                .get_or_try_init(|| hash_password_blocking(DUMMY_PASSWORD.to_string(), self.hash_cost))
                .await
                .cloned()
                .map_err(StoreError::Hashing)
        })
        .await
    }

    async fn verify(&self, ctx: &Context, password: &str, hash: String) -> Result<bool, StoreError> {
        within(ctx, async {
            verify_password_blocking(password.to_string(), hash)
                .await
                .map_err(StoreError::Hashing)
        })
        .await
    }

    #[instrument(skip_all, fields(email = %nu.email))]
    pub async fn create(&self, ctx: &Context, nu: NewUser, now: DateTime<Utc>) -> Result<User, StoreError> {
        let hash = self.hash(ctx, nu.password.clone()).await?;
        let user = User::create(nu, hash, Uuid::new_v4(), now);

        within(ctx, self.repo.create(&user)).await?;
        Ok(user)
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn update(
        &self,
        ctx: &Context,
        claims: &Claims,
        user_id: &str,
        uu: UpdateUser,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut user = self.query_by_id(ctx, claims, user_id).await?;

        if uu.roles.as_ref().is_some_and(|roles| *roles != user.roles) && !claims.is_admin() {
            warn!(subject = %claims.sub, user_id = %user.id, "non-admin attempted to change roles");
            return Err(StoreError::Forbidden);
        }

        let hash = match uu.password.clone() {
            Some(password) => Some(self.hash(ctx, password).await?),
            None => None,
        };
        user.apply(uu, hash, now);

        within(ctx, self.repo.update(&user)).await
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn delete(&self, ctx: &Context, claims: &Claims, user_id: &str) -> Result<(), StoreError> {
        let id = check_id(user_id)?;
        owner_or_admin(claims, &id.to_string())?;

        within(ctx, self.repo.delete(id)).await
    }

    pub async fn query_all(&self, ctx: &Context) -> Result<Vec<User>, StoreError> {
        within(ctx, self.repo.query_all()).await
    }

    #[instrument(skip_all, fields(user_id = %user_id))]
    pub async fn query_by_id(&self, ctx: &Context, claims: &Claims, user_id: &str) -> Result<User, StoreError> {
        let id = check_id(user_id)?;
        owner_or_admin(claims, &id.to_string())?;

        within(ctx, self.repo.query_by_id(id)).await
    }

    /// Looks a user up by email. A non-admin gets `Forbidden` both for another
    /// user's email and for an email nobody owns.
    pub async fn query_by_email(&self, ctx: &Context, claims: &Claims, email: &str) -> Result<User, StoreError> {
        match within(ctx, self.repo.query_by_email(email)).await {
            Ok(user) => {
                owner_or_admin(claims, &user.id.to_string())?;
                Ok(user)
            }
            Err(StoreError::NotFound) if !claims.is_admin() => Err(StoreError::Forbidden),
            Err(err) => Err(err),
        }
    }

    /// Verifies `password` against the stored hash for `email`. An unknown
    /// email and a wrong password are indistinguishable to the caller, in
    /// outcome and in time spent.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, ctx: &Context, email: &str, password: &str) -> Result<User, StoreError> {
        let user = match within(ctx, self.repo.query_by_email(email)).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => {
                let dummy = self.dummy_hash(ctx).await?;
                self.verify(ctx, password, dummy).await?;
                return Err(StoreError::AuthenticationFailure);
            }
            Err(err) => return Err(err),
        };

        match self.verify(ctx, password, user.password_hash.clone()).await {
            Ok(true) => Ok(user),
            Ok(false) => Err(StoreError::AuthenticationFailure),
            Err(StoreError::Hashing(err)) => {
                error!(user_id = %user.id, error = %err, "stored password hash is unusable");
                Err(StoreError::AuthenticationFailure)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn ping(&self, ctx: &Context) -> Result<(), StoreError> {
        within(ctx, self.repo.ping()).await
    }
}

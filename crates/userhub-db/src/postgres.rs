use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use userhub_core::StoreError;
use userhub_models::{User, UserRow};
use uuid::Uuid;

use crate::repository::UserRepository;

const SELECT_USER: &str = "SELECT user_id, name, email, roles, password_hash, date_created, date_updated FROM users";

#[derive(Clone, Debug)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database<E>(err: E, what: String) -> StoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    StoreError::Database(anyhow::Error::new(err).context(what))
}

fn one(result: Result<Option<UserRow>, sqlx::Error>, what: String) -> Result<User, StoreError> {
    match result {
        Ok(Some(row)) => Ok(row.into()),
        Ok(None) => Err(StoreError::NotFound),
        Err(e) => Err(database(e, what)),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        let row = UserRow::from(user.clone());
        sqlx::query(
            "INSERT INTO users (user_id, name, email, roles, password_hash, date_created, date_updated)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(row.user_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.roles)
        .bind(&row.password_hash)
        .bind(row.date_created)
        .bind(row.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| database(e, "inserting user".to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &User) -> Result<(), StoreError> {
        let row = UserRow::from(user.clone());
        let result = sqlx::query(
            "UPDATE users
             SET name = $2, email = $3, roles = $4, password_hash = $5, date_updated = $6
             WHERE user_id = $1",
        )
        .bind(row.user_id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.roles)
        .bind(&row.password_hash)
        .bind(row.date_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| database(e, format!("updating userID[{}]", row.user_id)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| database(e, format!("deleting userID[{}]", id)))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY date_created", SELECT_USER))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database(e, "selecting users".to_string()))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn query_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, UserRow>(&format!("{} WHERE user_id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        one(result, format!("selecting userID[{}]", id))
    }

    #[instrument(skip(self))]
    async fn query_by_email(&self, email: &str) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, UserRow>(&format!("{} WHERE email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await;

        one(result, format!("selecting email[{:?}]", email))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("pinging database")
            .map_err(StoreError::Database)?;

        Ok(())
    }
}

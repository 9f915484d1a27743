use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::RwLock;
use userhub_core::StoreError;
use userhub_models::User;
use uuid::Uuid;

use crate::repository::UserRepository;

/// In-process repository with the same contract as the Postgres one,
/// including the unique email constraint.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
    latency: Option<Duration>,
    unavailable: AtomicBool,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`, for exercising request deadlines.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every call fail as if the backend were down.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    async fn enter(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Database(anyhow!("repository unavailable")));
        }
        Ok(())
    }
}

fn email_taken(users: &HashMap<Uuid, User>, user: &User) -> bool {
    users
        .values()
        .any(|existing| existing.id != user.id && existing.email == user.email)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), StoreError> {
        self.enter().await?;
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || email_taken(&users, user) {
            return Err(StoreError::Database(anyhow!(
                "duplicate key value violates unique constraint"
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), StoreError> {
        self.enter().await?;
        let mut users = self.users.write().await;
        if email_taken(&users, user) {
            return Err(StoreError::Database(anyhow!(
                "duplicate key value violates unique constraint"
            )));
        }
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.enter().await?;
        self.users.write().await.remove(&id);
        Ok(())
    }

    async fn query_all(&self) -> Result<Vec<User>, StoreError> {
        self.enter().await?;
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| (u.date_created, u.id));
        Ok(users)
    }

    async fn query_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        self.enter().await?;
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn query_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.enter().await?;
        self.users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.enter().await
    }
}

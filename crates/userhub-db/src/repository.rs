use async_trait::async_trait;
use userhub_core::StoreError;
use userhub_models::User;
use uuid::Uuid;

/// Narrow CRUD interface over user storage.
///
/// Implementations report a missing record as [`StoreError::NotFound`] and any
/// backend failure as [`StoreError::Database`]. Authorization is not their
/// concern.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), StoreError>;
    async fn update(&self, user: &User) -> Result<(), StoreError>;
    /// Deleting an absent user is not an error.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
    async fn query_all(&self) -> Result<Vec<User>, StoreError>;
    async fn query_by_id(&self, id: Uuid) -> Result<User, StoreError>;
    async fn query_by_email(&self, email: &str) -> Result<User, StoreError>;
    /// Confirms the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

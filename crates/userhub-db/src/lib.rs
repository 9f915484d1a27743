//! # userhub DB
//!
//! Database pool and user repositories for the userhub API.
//!
//! The business layer talks to storage only through the [`UserRepository`]
//! trait. Two implementations ship with the crate:
//!
//! - [`PgUserRepository`]: PostgreSQL via SQLx, used by the service and CLI
//! - [`MemoryUserRepository`]: a `RwLock<HashMap>` used by tests
//!
//! # Schema
//!
//! Created by the migrations in `migrations/` (`userhub-admin migrate`):
//!
//! ```sql
//! CREATE TABLE users (
//!     user_id       UUID PRIMARY KEY,
//!     name          TEXT NOT NULL,
//!     email         TEXT UNIQUE NOT NULL,
//!     roles         TEXT[] NOT NULL,
//!     password_hash TEXT NOT NULL,
//!     date_created  TIMESTAMPTZ NOT NULL,
//!     date_updated  TIMESTAMPTZ NOT NULL
//! );
//! ```
//!
//! # Example
//!
//! ```ignore
//! use userhub_config::DatabaseConfig;
//! use userhub_db::{init_db_pool, PgUserRepository};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//! let users = PgUserRepository::new(pool);
//! ```

pub mod memory;
pub mod postgres;
pub mod repository;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use userhub_config::DatabaseConfig;

pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;
pub use repository::UserRepository;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Creates a PostgreSQL connection pool sized from `config`.
///
/// Call once during startup; the pool is cheaply cloneable.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .min_connections(config.max_idle_conns)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.url)
        .await?;

    info!(
        max_open = config.max_open_conns,
        max_idle = config.max_idle_conns,
        "database pool ready"
    );
    Ok(pool)
}

/// Applies the migrations under the workspace `migrations/` folder.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}

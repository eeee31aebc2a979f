//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the EVP workflow using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`]: SQL and row types
//! - [`adapters`]: the `SubmissionPort` implementation the domain talks to
//! - [`pool`]: connection pool configuration
//!
//! The schema lives in `migrations/` and is applied with [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PostgresSubmissionAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/evp")).await?;
//! infra_db::run_migrations(&pool).await?;
//! let adapter = PostgresSubmissionAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, DatabaseConfig};
pub use error::DatabaseError;
pub use adapters::PostgresSubmissionAdapter;

/// Applies the embedded EVP migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::QueryFailed(format!("migration failed: {e}")))
}

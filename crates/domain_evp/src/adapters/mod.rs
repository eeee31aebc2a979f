//! Adapters for the EVP domain
//!
//! - **InMemorySubmissionPort**: `tokio` lock-guarded maps, used by tests and
//!   by the API server when configured with in-memory storage
//!
//! The PostgreSQL adapter lives in `infra_db` to keep `sqlx` out of the
//! domain crate.

pub mod in_memory;

pub use in_memory::InMemorySubmissionPort;

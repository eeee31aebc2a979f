//! Repository implementations
//!
//! Repositories own the SQL and the row types; adapters map rows to domain
//! values. Writes that must be atomic run in a single transaction.

pub mod evp;

pub use evp::EvpRepository;

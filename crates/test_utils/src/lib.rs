//! Test Utilities Crate
//!
//! Shared test infrastructure for the EVP workflow test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built identifiers, amounts and comments
//! - `builders`: Submissions whose tracks are driven to a chosen status
//! - `database`: PostgreSQL test containers with the EVP schema
//! - `assertions`: Assertion helpers for tracks and role views
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;

//! Core Kernel - Foundational types shared by the EVP workflow crates
//!
//! This crate provides the building blocks used across the domain, storage
//! and API layers:
//! - Strongly-typed identifiers for submissions, employees and users
//! - The kernel error type used for parsing and validation
//! - Port infrastructure (error type, marker traits, health checks)

pub mod identifiers;
pub mod error;
pub mod ports;

pub use identifiers::{SubmissionId, EmployeeId, UserId, AuditEventId};
pub use error::CoreError;
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};

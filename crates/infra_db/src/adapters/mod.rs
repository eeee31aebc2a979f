//! Domain Adapters
//!
//! Implementations of domain ports backed by PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresSubmissionAdapter;
//! use domain_evp::SubmissionPort;
//!
//! let adapter = PostgresSubmissionAdapter::new(pool);
//! let submission = adapter.get_submission(submission_id).await?;
//! ```

pub mod evp;

pub use evp::PostgresSubmissionAdapter;

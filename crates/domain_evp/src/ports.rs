//! EVP Domain Ports
//!
//! The `SubmissionPort` trait is everything the validation service needs from
//! storage. Two adapters implement it:
//!
//! - **In-memory adapter** ([`crate::adapters::InMemorySubmissionPort`]): tests
//!   and local development
//! - **PostgreSQL adapter** (`infra_db`): production storage
//!
//! # Concurrency
//!
//! Track rows are versioned. [`SubmissionPort::commit_transition`] is a
//! compare-and-swap keyed on `(submission id, track type, expected version)`
//! and stores the audit event in the same atomic step. A lost race is
//! reported as `PortError::Conflict`.
//!
//! ```rust,ignore
//! let port: Arc<dyn SubmissionPort> = match config.storage {
//!     StorageBackend::Memory => Arc::new(InMemorySubmissionPort::new()),
//!     StorageBackend::Postgres => Arc::new(PostgresSubmissionAdapter::new(pool)),
//! };
//! let service = ValidationService::new(port);
//! ```

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, SubmissionId};

use crate::events::TrackEvent;
use crate::submission::Submission;
use crate::track::{ClaimTrack, TrackType};

/// Storage port for submissions and their tracks
#[async_trait]
pub trait SubmissionPort: DomainPort + HealthCheckable {
    /// Stores a new submission with all of its tracks
    ///
    /// Fails with `PortError::Conflict` if the id is already taken.
    async fn create_submission(&self, submission: &Submission) -> Result<(), PortError>;

    /// Loads a submission, or `PortError::NotFound`
    async fn get_submission(&self, id: SubmissionId) -> Result<Submission, PortError>;

    /// Loads every submission, oldest first
    async fn list_submissions(&self) -> Result<Vec<Submission>, PortError>;

    /// Adds a track to an existing submission
    ///
    /// Fails with `PortError::Conflict` if the submission already has a track
    /// of that type.
    async fn insert_track(&self, id: SubmissionId, track: &ClaimTrack) -> Result<(), PortError>;

    /// Replaces a track if its stored version still equals `expected_version`
    /// and appends `event` to its audit trail, atomically
    async fn commit_transition(
        &self,
        id: SubmissionId,
        expected_version: u64,
        track: &ClaimTrack,
        event: &TrackEvent,
    ) -> Result<(), PortError>;

    /// Audit events of one track, in commit order
    async fn track_history(
        &self,
        id: SubmissionId,
        track_type: TrackType,
    ) -> Result<Vec<TrackEvent>, PortError>;
}

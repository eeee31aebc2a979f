//! PostgreSQL Submission Adapter
//!
//! Implements `SubmissionPort` on top of [`EvpRepository`], translating
//! between domain values and database rows.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresSubmissionAdapter;
//! use domain_evp::ValidationService;
//!
//! let adapter = PostgresSubmissionAdapter::new(pool);
//! let service = ValidationService::new(Arc::new(adapter));
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, AuditEventId, DomainPort, EmployeeId, HealthCheckResult, HealthCheckable,
    PortError, SubmissionId, UserId,
};
use domain_evp::transition::Action;
use domain_evp::{ClaimTrack, Role, Submission, SubmissionPort, TrackEvent, TrackStatus, TrackType};

use crate::error::DatabaseError;
use crate::repositories::evp::{
    Action as DbAction, EvpRepository, Role as DbRole, SubmissionRow, SubmissionWithTracks,
    TrackEventRow, TrackRow, TrackStatus as DbTrackStatus, TrackType as DbTrackType,
};

const ADAPTER_ID: &str = "postgres-submission-adapter";

/// PostgreSQL-backed implementation of `SubmissionPort`
///
/// Database errors reach the domain as `PortError`; a version mismatch on
/// commit becomes `PortError::Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresSubmissionAdapter {
    repository: EvpRepository,
}

impl PostgresSubmissionAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: EvpRepository::new(pool),
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &EvpRepository {
        &self.repository
    }
}

impl DomainPort for PostgresSubmissionAdapter {}

#[async_trait]
impl HealthCheckable for PostgresSubmissionAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.repository.pool())
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SubmissionPort for PostgresSubmissionAdapter {
    #[instrument(skip(self, submission), fields(submission_id = %submission.id))]
    async fn create_submission(&self, submission: &Submission) -> Result<(), PortError> {
        let header = SubmissionRow {
            submission_id: *submission.id.as_uuid(),
            employee_ref: *submission.employee_ref.as_uuid(),
            submitted_by_ref: *submission.submitted_by_ref.as_uuid(),
            created_at: submission.created_at,
        };
        let tracks = submission
            .tracks()
            .map(|track| track_to_row(submission.id, track))
            .collect::<Result<Vec<_>, _>>()?;

        self.repository.insert_submission(&header, &tracks).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(submission_id = %id))]
    async fn get_submission(&self, id: SubmissionId) -> Result<Submission, PortError> {
        let data = self.repository.get_submission(*id.as_uuid()).await?;
        row_to_submission(data)
    }

    #[instrument(skip(self))]
    async fn list_submissions(&self) -> Result<Vec<Submission>, PortError> {
        let rows = self.repository.list_submissions().await?;
        debug!(count = rows.len(), "Listing EVP submissions");
        rows.into_iter().map(row_to_submission).collect()
    }

    #[instrument(skip(self, track), fields(submission_id = %id, track_type = %track.track_type))]
    async fn insert_track(&self, id: SubmissionId, track: &ClaimTrack) -> Result<(), PortError> {
        let row = track_to_row(id, track)?;
        self.repository.insert_track(&row).await?;
        Ok(())
    }

    #[instrument(skip(self, track, event), fields(submission_id = %id, track_type = %track.track_type))]
    async fn commit_transition(
        &self,
        id: SubmissionId,
        expected_version: u64,
        track: &ClaimTrack,
        event: &TrackEvent,
    ) -> Result<(), PortError> {
        let row = track_to_row(id, track)?;
        let event_row = event_to_row(event)?;
        self.repository
            .update_track_versioned(to_db_version(expected_version)?, &row, &event_row)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(submission_id = %id, track_type = %track_type))]
    async fn track_history(
        &self,
        id: SubmissionId,
        track_type: TrackType,
    ) -> Result<Vec<TrackEvent>, PortError> {
        let uuid = *id.as_uuid();
        if !self.repository.submission_exists(uuid).await? {
            return Err(DatabaseError::not_found("Submission", id).into());
        }

        self.repository
            .events_for_track(uuid, track_type.into())
            .await?
            .into_iter()
            .map(row_to_event)
            .collect()
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

fn to_db_version(version: u64) -> Result<i64, PortError> {
    i64::try_from(version)
        .map_err(|_| PortError::transformation(format!("version {version} does not fit BIGINT")))
}

fn from_db_version(version: i64) -> Result<u64, PortError> {
    u64::try_from(version)
        .map_err(|_| PortError::transformation(format!("negative stored version {version}")))
}

fn track_to_row(submission_id: SubmissionId, track: &ClaimTrack) -> Result<TrackRow, PortError> {
    Ok(TrackRow {
        submission_id: *submission_id.as_uuid(),
        track_type: track.track_type.into(),
        status: track.status.into(),
        amount: track.amount,
        submitted_at: track.submitted_at,
        comment: track.comment.clone(),
        was_service_approved_before_rejection: track.was_service_approved_before_rejection,
        version: to_db_version(track.version)?,
        updated_at: track.updated_at,
    })
}

fn row_to_track(row: TrackRow) -> Result<ClaimTrack, PortError> {
    Ok(ClaimTrack {
        track_type: row.track_type.into(),
        status: row.status.into(),
        amount: row.amount,
        submitted_at: row.submitted_at,
        comment: row.comment,
        was_service_approved_before_rejection: row.was_service_approved_before_rejection,
        version: from_db_version(row.version)?,
        updated_at: row.updated_at,
    })
}

fn row_to_submission(data: SubmissionWithTracks) -> Result<Submission, PortError> {
    let header = data.submission;
    let tracks = data
        .tracks
        .into_iter()
        .map(row_to_track)
        .collect::<Result<Vec<_>, _>>()?;

    Submission::from_parts(
        SubmissionId::from_uuid(header.submission_id),
        EmployeeId::from_uuid(header.employee_ref),
        UserId::from_uuid(header.submitted_by_ref),
        header.created_at,
        tracks,
    )
    .map_err(|e| {
        PortError::from(DatabaseError::CorruptRow(format!(
            "submission {}: {}",
            header.submission_id, e
        )))
    })
}

fn event_to_row(event: &TrackEvent) -> Result<TrackEventRow, PortError> {
    Ok(TrackEventRow {
        event_id: *event.id.as_uuid(),
        submission_id: *event.submission_id.as_uuid(),
        track_type: event.track_type.into(),
        action: event.action.into(),
        from_status: event.from_status.into(),
        to_status: event.to_status.into(),
        actor_role: event.actor_role.into(),
        comment: event.comment.clone(),
        version: to_db_version(event.version)?,
        occurred_at: event.timestamp,
    })
}

fn row_to_event(row: TrackEventRow) -> Result<TrackEvent, PortError> {
    Ok(TrackEvent {
        id: AuditEventId::from_uuid(row.event_id),
        submission_id: SubmissionId::from_uuid(row.submission_id),
        track_type: row.track_type.into(),
        action: row.action.into(),
        from_status: row.from_status.into(),
        to_status: row.to_status.into(),
        actor_role: row.actor_role.into(),
        comment: row.comment,
        version: from_db_version(row.version)?,
        timestamp: row.occurred_at,
    })
}

// ============================================================================
// Enum Conversions
// ============================================================================

impl From<TrackType> for DbTrackType {
    fn from(value: TrackType) -> Self {
        match value {
            TrackType::Prime => DbTrackType::Prime,
            TrackType::Conge => DbTrackType::Conge,
        }
    }
}

impl From<DbTrackType> for TrackType {
    fn from(value: DbTrackType) -> Self {
        match value {
            DbTrackType::Prime => TrackType::Prime,
            DbTrackType::Conge => TrackType::Conge,
        }
    }
}

impl From<TrackStatus> for DbTrackStatus {
    fn from(value: TrackStatus) -> Self {
        match value {
            TrackStatus::Entered => DbTrackStatus::Entered,
            TrackStatus::Submitted => DbTrackStatus::Submitted,
            TrackStatus::Resubmitted => DbTrackStatus::Resubmitted,
            TrackStatus::ApprovedByService => DbTrackStatus::ApprovedByService,
            TrackStatus::ApprovedByDivision => DbTrackStatus::ApprovedByDivision,
            TrackStatus::RejectedByService => DbTrackStatus::RejectedByService,
            TrackStatus::RejectedByDivision => DbTrackStatus::RejectedByDivision,
        }
    }
}

impl From<DbTrackStatus> for TrackStatus {
    fn from(value: DbTrackStatus) -> Self {
        match value {
            DbTrackStatus::Entered => TrackStatus::Entered,
            DbTrackStatus::Submitted => TrackStatus::Submitted,
            DbTrackStatus::Resubmitted => TrackStatus::Resubmitted,
            DbTrackStatus::ApprovedByService => TrackStatus::ApprovedByService,
            DbTrackStatus::ApprovedByDivision => TrackStatus::ApprovedByDivision,
            DbTrackStatus::RejectedByService => TrackStatus::RejectedByService,
            DbTrackStatus::RejectedByDivision => TrackStatus::RejectedByDivision,
        }
    }
}

impl From<Role> for DbRole {
    fn from(value: Role) -> Self {
        match value {
            Role::Gestionnaire => DbRole::Gestionnaire,
            Role::ResponsableService => DbRole::ResponsableService,
            Role::ResponsableDivision => DbRole::ResponsableDivision,
            Role::Rh => DbRole::Rh,
        }
    }
}

impl From<DbRole> for Role {
    fn from(value: DbRole) -> Self {
        match value {
            DbRole::Gestionnaire => Role::Gestionnaire,
            DbRole::ResponsableService => Role::ResponsableService,
            DbRole::ResponsableDivision => Role::ResponsableDivision,
            DbRole::Rh => Role::Rh,
        }
    }
}

impl From<Action> for DbAction {
    fn from(value: Action) -> Self {
        match value {
            Action::Submit => DbAction::Submit,
            Action::Resubmit => DbAction::Resubmit,
            Action::Approve => DbAction::Approve,
            Action::Reject => DbAction::Reject,
        }
    }
}

impl From<DbAction> for Action {
    fn from(value: DbAction) -> Self {
        match value {
            DbAction::Submit => Action::Submit,
            DbAction::Resubmit => Action::Resubmit,
            DbAction::Approve => Action::Approve,
            DbAction::Reject => Action::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_track_row_mapping_preserves_fields() {
        let mut track = ClaimTrack::draft(TrackType::Conge, dec!(320.50), Utc::now()).unwrap();
        track.status = TrackStatus::RejectedByDivision;
        track.submitted_at = Some(Utc::now());
        track.comment = Some("montant incorrect".to_string());
        track.was_service_approved_before_rejection = true;
        track.version = 3;

        let row = track_to_row(SubmissionId::new(), &track).unwrap();
        assert_eq!(row.status, DbTrackStatus::RejectedByDivision);
        assert_eq!(row.version, 3);

        assert_eq!(row_to_track(row).unwrap(), track);
    }

    #[test]
    fn test_negative_stored_version_is_a_transformation_error() {
        let result = from_db_version(-1);
        assert!(matches!(result, Err(PortError::Transformation { .. })));
    }

    #[test]
    fn test_enum_conversions_cover_every_variant() {
        for status in TrackStatus::ALL {
            assert_eq!(TrackStatus::from(DbTrackStatus::from(status)), status);
        }
        for role in Role::ALL {
            assert_eq!(Role::from(DbRole::from(role)), role);
        }
    }
}

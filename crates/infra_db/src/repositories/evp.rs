//! EVP repository implementation
//!
//! Row-level access to submissions, their claim tracks and the track audit
//! trail. Each track is its own row with its own version; writes to a track
//! are compare-and-swap updates on that version.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for EVP submissions and tracks
#[derive(Debug, Clone)]
pub struct EvpRepository {
    pool: PgPool,
}

const TRACK_COLUMNS: &str = r#"
    submission_id,
    track_type,
    status,
    amount,
    submitted_at,
    comment,
    was_service_approved_before_rejection,
    version,
    updated_at
"#;

impl EvpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Inserts a submission and all of its tracks in a single transaction
    pub async fn insert_submission(
        &self,
        submission: &SubmissionRow,
        tracks: &[TrackRow],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO evp_submissions (submission_id, employee_ref, submitted_by_ref, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(submission.submission_id)
        .bind(submission.employee_ref)
        .bind(submission.submitted_by_ref)
        .bind(submission.created_at)
        .execute(&mut *tx)
        .await?;

        for track in tracks {
            insert_track_row(&mut tx, track).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Retrieves a submission with its tracks
    pub async fn get_submission(&self, submission_id: Uuid) -> Result<SubmissionWithTracks, DatabaseError> {
        let submission = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT submission_id, employee_ref, submitted_by_ref, created_at
            FROM evp_submissions
            WHERE submission_id = $1
            "#,
        )
        .bind(submission_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Submission", submission_id))?;

        let tracks = sqlx::query_as::<_, TrackRow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM evp_claim_tracks WHERE submission_id = $1 ORDER BY track_type"
        ))
        .bind(submission_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SubmissionWithTracks { submission, tracks })
    }

    /// Retrieves every submission with its tracks, oldest first
    pub async fn list_submissions(&self) -> Result<Vec<SubmissionWithTracks>, DatabaseError> {
        let submissions = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT submission_id, employee_ref, submitted_by_ref, created_at
            FROM evp_submissions
            ORDER BY created_at, submission_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let tracks = sqlx::query_as::<_, TrackRow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM evp_claim_tracks ORDER BY submission_id, track_type"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(submissions = submissions.len(), tracks = tracks.len(), "Loaded EVP submissions");

        let mut by_submission: HashMap<Uuid, Vec<TrackRow>> = HashMap::new();
        for track in tracks {
            by_submission.entry(track.submission_id).or_default().push(track);
        }

        Ok(submissions
            .into_iter()
            .map(|submission| {
                let tracks = by_submission
                    .remove(&submission.submission_id)
                    .unwrap_or_default();
                SubmissionWithTracks { submission, tracks }
            })
            .collect())
    }

    /// Adds a track row to an existing submission
    pub async fn insert_track(&self, track: &TrackRow) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM evp_submissions WHERE submission_id = $1)",
        )
        .bind(track.submission_id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(DatabaseError::not_found("Submission", track.submission_id));
        }

        insert_track_row(&mut tx, track).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Updates a track if it is still at `expected_version` and appends the
    /// audit event, in one transaction
    pub async fn update_track_versioned(
        &self,
        expected_version: i64,
        track: &TrackRow,
        event: &TrackEventRow,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE evp_claim_tracks
            SET status = $4,
                amount = $5,
                submitted_at = $6,
                comment = $7,
                was_service_approved_before_rejection = $8,
                version = $9,
                updated_at = $10
            WHERE submission_id = $1 AND track_type = $2 AND version = $3
            "#,
        )
        .bind(track.submission_id)
        .bind(track.track_type)
        .bind(expected_version)
        .bind(track.status)
        .bind(track.amount)
        .bind(track.submitted_at)
        .bind(&track.comment)
        .bind(track.was_service_approved_before_rejection)
        .bind(track.version)
        .bind(track.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let stored = sqlx::query_scalar::<_, i64>(
                "SELECT version FROM evp_claim_tracks WHERE submission_id = $1 AND track_type = $2",
            )
            .bind(track.submission_id)
            .bind(track.track_type)
            .fetch_optional(&mut *tx)
            .await?;

            return Err(match stored {
                Some(version) => DatabaseError::VersionConflict(format!(
                    "track {:?} of {} is at version {}, expected {}",
                    track.track_type, track.submission_id, version, expected_version
                )),
                None => DatabaseError::not_found(
                    "ClaimTrack",
                    format!("{}/{:?}", track.submission_id, track.track_type),
                ),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO evp_track_events (
                event_id, submission_id, track_type, action, from_status, to_status,
                actor_role, comment, version, occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.event_id)
        .bind(event.submission_id)
        .bind(event.track_type)
        .bind(event.action)
        .bind(event.from_status)
        .bind(event.to_status)
        .bind(event.actor_role)
        .bind(&event.comment)
        .bind(event.version)
        .bind(event.occurred_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Audit events of one track, in version order
    pub async fn events_for_track(
        &self,
        submission_id: Uuid,
        track_type: TrackType,
    ) -> Result<Vec<TrackEventRow>, DatabaseError> {
        let events = sqlx::query_as::<_, TrackEventRow>(
            r#"
            SELECT event_id, submission_id, track_type, action, from_status, to_status,
                   actor_role, comment, version, occurred_at
            FROM evp_track_events
            WHERE submission_id = $1 AND track_type = $2
            ORDER BY version
            "#,
        )
        .bind(submission_id)
        .bind(track_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    pub async fn submission_exists(&self, submission_id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM evp_submissions WHERE submission_id = $1)",
        )
        .bind(submission_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

async fn insert_track_row(
    tx: &mut Transaction<'_, Postgres>,
    track: &TrackRow,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO evp_claim_tracks (
            submission_id, track_type, status, amount, submitted_at, comment,
            was_service_approved_before_rejection, version, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(track.submission_id)
    .bind(track.track_type)
    .bind(track.status)
    .bind(track.amount)
    .bind(track.submitted_at)
    .bind(&track.comment)
    .bind(track.was_service_approved_before_rejection)
    .bind(track.version)
    .bind(track.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

// ============================================================================
// Row Types
// ============================================================================

/// Database row for a submission header
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubmissionRow {
    pub submission_id: Uuid,
    pub employee_ref: Uuid,
    pub submitted_by_ref: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Database row for one claim track
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackRow {
    pub submission_id: Uuid,
    pub track_type: TrackType,
    pub status: TrackStatus,
    pub amount: Decimal,
    pub submitted_at: Option<DateTime<Utc>>,
    pub comment: Option<String>,
    pub was_service_approved_before_rejection: bool,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Database row for one audit event
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackEventRow {
    pub event_id: Uuid,
    pub submission_id: Uuid,
    pub track_type: TrackType,
    pub action: Action,
    pub from_status: TrackStatus,
    pub to_status: TrackStatus,
    pub actor_role: Role,
    pub comment: Option<String>,
    pub version: i64,
    pub occurred_at: DateTime<Utc>,
}

/// A submission with its track rows
#[derive(Debug, Clone)]
pub struct SubmissionWithTracks {
    pub submission: SubmissionRow,
    pub tracks: Vec<TrackRow>,
}

// ============================================================================
// Database Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evp_track_type", rename_all = "snake_case")]
pub enum TrackType {
    Prime,
    Conge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evp_track_status", rename_all = "snake_case")]
pub enum TrackStatus {
    Entered,
    Submitted,
    Resubmitted,
    ApprovedByService,
    ApprovedByDivision,
    RejectedByService,
    RejectedByDivision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evp_role", rename_all = "snake_case")]
pub enum Role {
    Gestionnaire,
    ResponsableService,
    ResponsableDivision,
    Rh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "evp_action", rename_all = "snake_case")]
pub enum Action {
    Submit,
    Resubmit,
    Approve,
    Reject,
}

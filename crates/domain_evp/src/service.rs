//! Validation service
//!
//! The single write path for EVP tracks and the entry point for role queries.
//! Every write loads the submission, runs the transition engine on exactly
//! one track, and commits that track through the port's compare-and-swap
//! together with its audit event. The sibling track is never written.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use core_kernel::{EmployeeId, HealthCheckResult, PortError, SubmissionId, UserId};

use crate::error::EvpError;
use crate::events::TrackEvent;
use crate::ports::SubmissionPort;
use crate::projector::{project_for_role, project_track, ProjectedView, TrackProjection};
use crate::reporting::{approved_tracks, summarize, ExportedTrack, ReportingSummary};
use crate::role::Role;
use crate::submission::{Submission, TrackDraft};
use crate::track::{ClaimTrack, TrackStatus, TrackType};
use crate::transition::{apply, Action, TrackCommand};

/// A gestionnaire (re)submitting one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitClaim {
    pub submission_id: SubmissionId,
    pub track_type: TrackType,
    pub actor: Role,
    pub amount: Decimal,
    /// Version the caller last saw; `None` accepts whatever is stored
    pub expected_version: Option<u64>,
}

/// A decision on one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecideCommand {
    pub submission_id: SubmissionId,
    pub track_type: TrackType,
    pub actor: Role,
    pub action: Action,
    pub comment: Option<String>,
    /// Version the caller last saw; `None` accepts whatever is stored
    pub expected_version: Option<u64>,
}

impl DecideCommand {
    pub fn new(submission_id: SubmissionId, track_type: TrackType, actor: Role, action: Action) -> Self {
        Self {
            submission_id,
            track_type,
            actor,
            action,
            comment: None,
            expected_version: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn expecting_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Application service over a [`SubmissionPort`]
#[derive(Clone)]
pub struct ValidationService {
    port: Arc<dyn SubmissionPort>,
}

impl ValidationService {
    pub fn new(port: Arc<dyn SubmissionPort>) -> Self {
        Self { port }
    }

    /// Opens a submission with `Entered` tracks (gestionnaire only)
    pub async fn open_submission(
        &self,
        actor: Role,
        employee_ref: EmployeeId,
        submitted_by_ref: UserId,
        drafts: &[TrackDraft],
    ) -> Result<Submission, EvpError> {
        require_role(actor, Role::Gestionnaire, "cannot open a submission")?;

        let submission = Submission::open(employee_ref, submitted_by_ref, drafts, Utc::now())?;
        self.port.create_submission(&submission).await?;

        info!(
            submission_id = %submission.id,
            employee = %employee_ref,
            tracks = drafts.len(),
            "EVP submission opened"
        );
        Ok(submission)
    }

    /// Adds the missing sibling track to a submission (gestionnaire only)
    pub async fn attach_track(
        &self,
        actor: Role,
        submission_id: SubmissionId,
        track_type: TrackType,
        amount: Decimal,
    ) -> Result<ClaimTrack, EvpError> {
        require_role(actor, Role::Gestionnaire, "cannot attach a track")?;

        let mut submission = self.load(submission_id).await?;
        let track = submission.attach_track(track_type, amount, Utc::now())?.clone();

        self.port
            .insert_track(submission_id, &track)
            .await
            .map_err(|e| match e {
                PortError::Conflict { .. } => EvpError::DuplicateTrack(track_type),
                other => EvpError::Storage(other),
            })?;

        info!(submission_id = %submission_id, track_type = %track_type, "EVP track attached");
        Ok(track)
    }

    /// Submits an `Entered` track or resubmits a `RejectedByService` one
    pub async fn submit_claim(&self, command: SubmitClaim) -> Result<ClaimTrack, EvpError> {
        let submission = self.load(command.submission_id).await?;
        let track = submission.require_track(command.track_type)?;

        let action = match track.status {
            TrackStatus::RejectedByService => Action::Resubmit,
            _ => Action::Submit,
        };
        let track_command = TrackCommand::new(command.actor, action).with_amount(command.amount);

        self.execute(&submission, command.track_type, command.expected_version, track_command)
            .await
    }

    /// Applies an approval, rejection or resubmission to one track
    ///
    /// Returns the updated track as the acting role now sees it.
    pub async fn decide(&self, command: DecideCommand) -> Result<TrackProjection, EvpError> {
        let submission = self.load(command.submission_id).await?;

        let mut track_command = TrackCommand::new(command.actor, command.action);
        track_command.comment = command.comment;

        let track = self
            .execute(&submission, command.track_type, command.expected_version, track_command)
            .await?;
        Ok(project_track(command.actor, &track))
    }

    /// [`ValidationService::decide`], retried once on a lost race
    ///
    /// Only unpinned commands are retried; a caller that sent an expected
    /// version gets the `StaleState` back.
    pub async fn decide_retrying_once(&self, command: DecideCommand) -> Result<TrackProjection, EvpError> {
        if command.expected_version.is_some() {
            return self.decide(command).await;
        }
        match self.decide(command.clone()).await {
            Err(e) if e.is_retryable() => {
                debug!(
                    submission_id = %command.submission_id,
                    track_type = %command.track_type,
                    "Retrying EVP decision after concurrent update"
                );
                self.decide(command).await
            }
            result => result,
        }
    }

    /// Submissions as `role` sees them
    pub async fn project_for_role(&self, role: Role) -> Result<Vec<ProjectedView>, EvpError> {
        let submissions = self.port.list_submissions().await?;
        Ok(project_for_role(role, &submissions))
    }

    /// Tracks of `track_type` ready for payroll (RH only)
    pub async fn export_approved_tracks(
        &self,
        actor: Role,
        track_type: TrackType,
    ) -> Result<Vec<ExportedTrack>, EvpError> {
        require_role(actor, Role::Rh, "cannot export approved tracks")?;

        let submissions = self.port.list_submissions().await?;
        let exported = approved_tracks(&submissions, track_type);
        info!(track_type = %track_type, count = exported.len(), "EVP export prepared");
        Ok(exported)
    }

    /// Counts per display status and track type (RH only)
    pub async fn reporting_summary(&self, actor: Role) -> Result<ReportingSummary, EvpError> {
        require_role(actor, Role::Rh, "cannot read the reporting summary")?;
        let submissions = self.port.list_submissions().await?;
        Ok(summarize(&submissions))
    }

    pub async fn get_submission(&self, submission_id: SubmissionId) -> Result<Submission, EvpError> {
        self.load(submission_id).await
    }

    pub async fn track_history(
        &self,
        submission_id: SubmissionId,
        track_type: TrackType,
    ) -> Result<Vec<TrackEvent>, EvpError> {
        let submission = self.load(submission_id).await?;
        submission.require_track(track_type)?;
        Ok(self.port.track_history(submission_id, track_type).await?)
    }

    pub async fn health(&self) -> HealthCheckResult {
        self.port.health_check().await
    }

    async fn load(&self, submission_id: SubmissionId) -> Result<Submission, EvpError> {
        self.port.get_submission(submission_id).await.map_err(|e| {
            if e.is_not_found() {
                EvpError::SubmissionNotFound(submission_id)
            } else {
                EvpError::Storage(e)
            }
        })
    }

    async fn execute(
        &self,
        submission: &Submission,
        track_type: TrackType,
        expected_version: Option<u64>,
        command: TrackCommand,
    ) -> Result<ClaimTrack, EvpError> {
        let before = submission.require_track(track_type)?;
        let stale = EvpError::StaleState {
            submission_id: submission.id,
            track_type,
            expected: expected_version.unwrap_or(before.version),
        };

        if expected_version.is_some_and(|v| v != before.version) {
            warn!(
                submission_id = %submission.id,
                track_type = %track_type,
                stored = before.version,
                "EVP command refused: stale version"
            );
            return Err(stale);
        }

        let after = apply(before, &command, Utc::now()).inspect_err(|e| {
            warn!(
                submission_id = %submission.id,
                track_type = %track_type,
                role = %command.actor,
                action = %command.action,
                status = %before.status,
                error = %e,
                "EVP command refused"
            );
        })?;

        let event = TrackEvent::record(
            submission.id,
            before,
            &after,
            command.actor,
            command.action,
            command.normalized_comment(),
        );

        self.port
            .commit_transition(submission.id, before.version, &after, &event)
            .await
            .map_err(|e| if e.is_conflict() { stale } else { EvpError::Storage(e) })?;

        info!(
            submission_id = %submission.id,
            track_type = %track_type,
            from = %before.status,
            to = %after.status,
            role = %command.actor,
            version = after.version,
            event = event.event_type(),
            "EVP track transition committed"
        );
        Ok(after)
    }
}

fn require_role(actor: Role, required: Role, reason: &str) -> Result<(), EvpError> {
    if actor == required {
        Ok(())
    } else {
        Err(EvpError::Unauthorized {
            role: actor,
            reason: reason.to_string(),
        })
    }
}

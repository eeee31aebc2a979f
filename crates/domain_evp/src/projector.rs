//! Role projector
//!
//! Computes what each role sees of the submissions: which tracks appear,
//! which of them can be acted on, and with which actions. The projector is a
//! pure read-side function; it never mutates a submission.
//!
//! | Role                 | Actionable                                   | Read-only        |
//! |----------------------|----------------------------------------------|------------------|
//! | Gestionnaire         | `Entered`, `RejectedByService`               | every other track |
//! | Responsable Service  | `Submitted`, `Resubmitted`, `RejectedByDivision` | none          |
//! | Responsable Division | `ApprovedByService`                          | none             |
//! | RH                   | none                                         | every track      |
//!
//! A track never leaves the system, only a role's queue.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{EmployeeId, SubmissionId, UserId};
use crate::role::Role;
use crate::submission::Submission;
use crate::track::{ClaimTrack, DisplayStatus, TrackStatus, TrackType};
use crate::transition::{available_actions, Action};

/// How a track appears to a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Not part of the role's view
    Hidden,
    /// Shown for history or reporting
    ReadOnly,
    /// In the role's queue, with at least one action
    Actionable,
}

/// Visibility of a track in `status` for `role`
pub fn visibility(role: Role, status: TrackStatus) -> Visibility {
    if !available_actions(role, status).is_empty() {
        return Visibility::Actionable;
    }
    match role {
        Role::Gestionnaire | Role::Rh => Visibility::ReadOnly,
        Role::ResponsableService | Role::ResponsableDivision => Visibility::Hidden,
    }
}

/// One track as seen by one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProjection {
    pub track_type: TrackType,
    pub status: TrackStatus,
    pub display_status: DisplayStatus,
    pub amount: Decimal,
    pub comment: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub was_service_approved_before_rejection: bool,
    pub version: u64,
    pub visibility: Visibility,
    pub actions: Vec<Action>,
}

impl TrackProjection {
    pub fn is_visible(&self) -> bool {
        self.visibility != Visibility::Hidden
    }

    pub fn is_actionable(&self) -> bool {
        self.visibility == Visibility::Actionable
    }
}

/// A submission as seen by one role, holding only its visible tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedView {
    pub submission_id: SubmissionId,
    pub employee_ref: EmployeeId,
    pub submitted_by_ref: UserId,
    pub tracks: Vec<TrackProjection>,
}

/// Projects a single track for `role`
pub fn project_track(role: Role, track: &ClaimTrack) -> TrackProjection {
    TrackProjection {
        track_type: track.track_type,
        status: track.status,
        display_status: track.display_status(),
        amount: track.amount,
        comment: track.comment.clone(),
        submitted_at: track.submitted_at,
        was_service_approved_before_rejection: track.was_service_approved_before_rejection,
        version: track.version,
        visibility: visibility(role, track.status),
        actions: available_actions(role, track.status),
    }
}

/// Projects a submission for `role`, `None` when no track is visible
pub fn project_submission(role: Role, submission: &Submission) -> Option<ProjectedView> {
    let tracks: Vec<_> = submission
        .tracks()
        .map(|track| project_track(role, track))
        .filter(TrackProjection::is_visible)
        .collect();

    if tracks.is_empty() {
        return None;
    }

    Some(ProjectedView {
        submission_id: submission.id,
        employee_ref: submission.employee_ref,
        submitted_by_ref: submission.submitted_by_ref,
        tracks,
    })
}

/// Projects every submission for `role`, keeping input order
pub fn project_for_role(role: Role, submissions: &[Submission]) -> Vec<ProjectedView> {
    submissions
        .iter()
        .filter_map(|submission| project_submission(role, submission))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_matrix() {
        use TrackStatus::*;
        use Visibility::*;

        let expected = [
            // status, gestionnaire, service, division, rh
            (Entered, Actionable, Hidden, Hidden, ReadOnly),
            (Submitted, ReadOnly, Actionable, Hidden, ReadOnly),
            (Resubmitted, ReadOnly, Actionable, Hidden, ReadOnly),
            (ApprovedByService, ReadOnly, Hidden, Actionable, ReadOnly),
            (ApprovedByDivision, ReadOnly, Hidden, Hidden, ReadOnly),
            (RejectedByService, Actionable, Hidden, Hidden, ReadOnly),
            (RejectedByDivision, ReadOnly, Actionable, Hidden, ReadOnly),
        ];

        for (status, gestionnaire, service, division, rh) in expected {
            assert_eq!(visibility(Role::Gestionnaire, status), gestionnaire, "{status}");
            assert_eq!(visibility(Role::ResponsableService, status), service, "{status}");
            assert_eq!(visibility(Role::ResponsableDivision, status), division, "{status}");
            assert_eq!(visibility(Role::Rh, status), rh, "{status}");
        }
    }

    #[test]
    fn test_rh_never_gets_actions() {
        for status in TrackStatus::ALL {
            assert!(available_actions(Role::Rh, status).is_empty());
        }
    }
}

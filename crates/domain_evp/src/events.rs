//! Audit events for track transitions
//!
//! Every committed transition produces exactly one event. Events are the
//! audit trail of a track; rejection comments survive here after the track
//! itself has moved on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AuditEventId, SubmissionId};
use crate::role::Role;
use crate::track::{ClaimTrack, TrackStatus, TrackType};
use crate::transition::Action;

/// Record of one committed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub id: AuditEventId,
    pub submission_id: SubmissionId,
    pub track_type: TrackType,
    pub action: Action,
    pub from_status: TrackStatus,
    pub to_status: TrackStatus,
    pub actor_role: Role,
    pub comment: Option<String>,
    /// Version the track reached with this transition
    pub version: u64,
    pub timestamp: DateTime<Utc>,
}

impl TrackEvent {
    /// Builds the event for `before` becoming `after`
    pub fn record(
        submission_id: SubmissionId,
        before: &ClaimTrack,
        after: &ClaimTrack,
        actor_role: Role,
        action: Action,
        comment: Option<String>,
    ) -> Self {
        Self {
            id: AuditEventId::new(),
            submission_id,
            track_type: after.track_type,
            action,
            from_status: before.status,
            to_status: after.status,
            actor_role,
            comment,
            version: after.version,
            timestamp: after.updated_at,
        }
    }

    /// Dotted name used in logs and downstream integrations
    pub fn event_type(&self) -> &'static str {
        match self.to_status {
            TrackStatus::Entered => "evp.track.entered",
            TrackStatus::Submitted => "evp.track.submitted",
            TrackStatus::Resubmitted => "evp.track.resubmitted",
            TrackStatus::ApprovedByService => "evp.track.approved_by_service",
            TrackStatus::ApprovedByDivision => "evp.track.approved_by_division",
            TrackStatus::RejectedByService => "evp.track.rejected_by_service",
            TrackStatus::RejectedByDivision => "evp.track.rejected_by_division",
        }
    }
}

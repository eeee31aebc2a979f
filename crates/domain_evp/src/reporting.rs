//! HR reporting and payroll export

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{EmployeeId, SubmissionId};
use crate::projector::project_for_role;
use crate::role::Role;
use crate::submission::Submission;
use crate::track::{ClaimTrack, DisplayStatus, TrackType};

/// A track ready for the payroll system, with the references it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedTrack {
    pub submission_id: SubmissionId,
    pub employee_ref: EmployeeId,
    pub track: ClaimTrack,
}

/// Every `ApprovedByDivision` track of the given type
pub fn approved_tracks(submissions: &[Submission], track_type: TrackType) -> Vec<ExportedTrack> {
    submissions
        .iter()
        .filter_map(|submission| {
            submission
                .track(track_type)
                .filter(|track| track.is_exportable())
                .map(|track| ExportedTrack {
                    submission_id: submission.id,
                    employee_ref: submission.employee_ref,
                    track: track.clone(),
                })
        })
        .collect()
}

/// Counts for one track type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTypeSummary {
    pub validated: usize,
    pub rejected: usize,
    pub pending: usize,
    /// Sum of amounts that reached `ApprovedByDivision`
    pub exportable_amount: Decimal,
}

impl TrackTypeSummary {
    pub fn total(&self) -> usize {
        self.validated + self.rejected + self.pending
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingSummary {
    pub prime: TrackTypeSummary,
    pub conge: TrackTypeSummary,
}

impl ReportingSummary {
    pub fn for_type(&self, track_type: TrackType) -> &TrackTypeSummary {
        match track_type {
            TrackType::Prime => &self.prime,
            TrackType::Conge => &self.conge,
        }
    }

    fn for_type_mut(&mut self, track_type: TrackType) -> &mut TrackTypeSummary {
        match track_type {
            TrackType::Prime => &mut self.prime,
            TrackType::Conge => &mut self.conge,
        }
    }
}

/// Aggregates the RH view of `submissions`
pub fn summarize(submissions: &[Submission]) -> ReportingSummary {
    let mut summary = ReportingSummary::default();

    for view in project_for_role(Role::Rh, submissions) {
        for track in view.tracks {
            let entry = summary.for_type_mut(track.track_type);
            match track.display_status {
                DisplayStatus::Validated => entry.validated += 1,
                DisplayStatus::Rejected => entry.rejected += 1,
                DisplayStatus::Pending => entry.pending += 1,
            }
            if track.status.is_terminal() {
                entry.exportable_amount += track.amount;
            }
        }
    }

    summary
}

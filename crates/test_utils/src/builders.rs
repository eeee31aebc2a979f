//! Test Data Builders
//!
//! Builds submissions whose tracks sit in a chosen status. Tracks are driven
//! there through the real transition engine, so versions, timestamps and the
//! rejection flag are exactly what production code would produce.

use chrono::Utc;
use core_kernel::{EmployeeId, UserId};
use domain_evp::transition::{apply, Action, TrackCommand};
use domain_evp::{
    ClaimTrack, DecideCommand, Role, SubmitClaim, Submission, TrackDraft, TrackStatus, TrackType,
    ValidationService,
};
use rust_decimal::Decimal;

use crate::fixtures::{AmountFixtures, CommentFixtures, IdFixtures};

/// Legal sequence of (role, action) leading from `Entered` to `status`
pub fn path_to(status: TrackStatus) -> Vec<(Role, Action)> {
    use Action::*;
    use Role::*;

    let submit = (Gestionnaire, Submit);
    match status {
        TrackStatus::Entered => vec![],
        TrackStatus::Submitted => vec![submit],
        TrackStatus::ApprovedByService => vec![submit, (ResponsableService, Approve)],
        TrackStatus::RejectedByService => vec![submit, (ResponsableService, Reject)],
        TrackStatus::Resubmitted => vec![
            submit,
            (ResponsableService, Reject),
            (Gestionnaire, Resubmit),
        ],
        TrackStatus::RejectedByDivision => vec![
            submit,
            (ResponsableService, Approve),
            (ResponsableDivision, Reject),
        ],
        TrackStatus::ApprovedByDivision => vec![
            submit,
            (ResponsableService, Approve),
            (ResponsableDivision, Approve),
        ],
    }
}

fn step_command(role: Role, action: Action) -> TrackCommand {
    let command = TrackCommand::new(role, action);
    if action == Action::Reject {
        command.with_comment(CommentFixtures::service_rejection())
    } else {
        command
    }
}

/// Drives an `Entered` track to `status`
///
/// # Panics
///
/// Panics if the track is not `Entered`.
pub fn drive_track(track: &ClaimTrack, status: TrackStatus) -> ClaimTrack {
    assert_eq!(track.status, TrackStatus::Entered, "drive_track starts from Entered");
    path_to(status)
        .into_iter()
        .fold(track.clone(), |current, (role, action)| {
            apply(&current, &step_command(role, action), Utc::now())
                .unwrap_or_else(|e| panic!("path to {status} failed at {action}: {e}"))
        })
}

/// Builder for submissions in arbitrary states
pub struct TestSubmissionBuilder {
    employee_ref: EmployeeId,
    submitted_by_ref: UserId,
    prime: Option<(Decimal, TrackStatus)>,
    conge: Option<(Decimal, TrackStatus)>,
}

impl Default for TestSubmissionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSubmissionBuilder {
    /// Creates a builder with no tracks
    pub fn new() -> Self {
        Self {
            employee_ref: IdFixtures::employee(),
            submitted_by_ref: IdFixtures::gestionnaire_user(),
            prime: None,
            conge: None,
        }
    }

    pub fn with_employee(mut self, employee_ref: EmployeeId) -> Self {
        self.employee_ref = employee_ref;
        self
    }

    /// Adds a Prime track in `status`
    pub fn with_prime(mut self, status: TrackStatus) -> Self {
        self.prime = Some((AmountFixtures::prime(), status));
        self
    }

    /// Adds a Congé track in `status`
    pub fn with_conge(mut self, status: TrackStatus) -> Self {
        self.conge = Some((AmountFixtures::conge(), status));
        self
    }

    pub fn with_track(mut self, track_type: TrackType, amount: Decimal, status: TrackStatus) -> Self {
        match track_type {
            TrackType::Prime => self.prime = Some((amount, status)),
            TrackType::Conge => self.conge = Some((amount, status)),
        }
        self
    }

    fn drafts(&self) -> Vec<(TrackDraft, TrackStatus)> {
        let prime = self
            .prime
            .map(|(amount, status)| (TrackDraft::new(TrackType::Prime, amount), status));
        let conge = self
            .conge
            .map(|(amount, status)| (TrackDraft::new(TrackType::Conge, amount), status));
        prime.into_iter().chain(conge).collect()
    }

    /// Builds the submission in memory, bypassing storage
    ///
    /// # Panics
    ///
    /// Panics if no track was added.
    pub fn build(self) -> Submission {
        let targets = self.drafts();
        let drafts: Vec<_> = targets.iter().map(|(draft, _)| *draft).collect();
        let mut submission =
            Submission::open(self.employee_ref, self.submitted_by_ref, &drafts, Utc::now())
                .expect("builder needs at least one track");

        for (draft, status) in targets {
            let entered = submission
                .track(draft.track_type)
                .cloned()
                .expect("track was just opened");
            submission
                .replace_track(drive_track(&entered, status))
                .expect("track exists");
        }
        submission
    }

    /// Opens the submission and drives its tracks through `service`
    ///
    /// Unlike [`TestSubmissionBuilder::build`] this records audit events.
    ///
    /// # Panics
    ///
    /// Panics if any step is refused.
    pub async fn persist_via(self, service: &ValidationService) -> Submission {
        let targets = self.drafts();
        let drafts: Vec<_> = targets.iter().map(|(draft, _)| *draft).collect();
        let submission = service
            .open_submission(Role::Gestionnaire, self.employee_ref, self.submitted_by_ref, &drafts)
            .await
            .expect("open submission");

        for (draft, status) in targets {
            for (role, action) in path_to(status) {
                match action {
                    Action::Submit | Action::Resubmit => {
                        service
                            .submit_claim(SubmitClaim {
                                submission_id: submission.id,
                                track_type: draft.track_type,
                                actor: role,
                                amount: draft.amount,
                                expected_version: None,
                            })
                            .await
                            .expect("submit step");
                    }
                    Action::Approve | Action::Reject => {
                        let mut command =
                            DecideCommand::new(submission.id, draft.track_type, role, action);
                        if action == Action::Reject {
                            command = command.with_comment(CommentFixtures::service_rejection());
                        }
                        service.decide(command).await.expect("decision step");
                    }
                }
            }
        }

        service
            .get_submission(submission.id)
            .await
            .expect("reload submission")
    }
}

//! Role projector tests

use proptest::prelude::*;

use domain_evp::projector::{project_submission, visibility};
use domain_evp::transition::{available_actions, owner_of};
use domain_evp::{project_for_role, Role, Submission, TrackStatus, TrackType, Visibility};
use test_utils::{
    assert_in_queue, assert_not_in_queue, role_strategy, status_strategy, TestSubmissionBuilder,
};

fn pair(prime: TrackStatus, conge: TrackStatus) -> Submission {
    TestSubmissionBuilder::new().with_prime(prime).with_conge(conge).build()
}

mod queue_tests {
    use super::*;

    #[test]
    fn test_each_track_lands_in_its_owner_queue() {
        let submissions: Vec<_> = TrackStatus::ALL
            .into_iter()
            .map(|status| TestSubmissionBuilder::new().with_prime(status).build())
            .collect();

        for role in Role::ALL {
            let queue = project_for_role(role, &submissions);
            for submission in &submissions {
                let status = submission.track(TrackType::Prime).unwrap().status;
                match visibility(role, status) {
                    Visibility::Hidden => assert_not_in_queue(&queue, submission.id, TrackType::Prime),
                    shown => assert_in_queue(&queue, submission.id, TrackType::Prime, shown),
                }
            }
        }
    }

    #[test]
    fn test_rh_sees_every_track_read_only() {
        let submission = pair(TrackStatus::Entered, TrackStatus::ApprovedByDivision);
        let view = project_submission(Role::Rh, &submission).unwrap();

        assert_eq!(view.tracks.len(), 2);
        assert!(view.tracks.iter().all(|t| t.visibility == Visibility::ReadOnly));
        assert!(view.tracks.iter().all(|t| t.actions.is_empty()));
    }

    #[test]
    fn test_division_queue_ignores_submission_without_division_work() {
        let submission = pair(TrackStatus::ApprovedByDivision, TrackStatus::Submitted);
        assert!(project_submission(Role::ResponsableDivision, &submission).is_none());
    }

    #[test]
    fn test_split_decision_shows_each_track_once() {
        let submission = pair(TrackStatus::RejectedByDivision, TrackStatus::ApprovedByService);

        let service = project_submission(Role::ResponsableService, &submission).unwrap();
        assert_eq!(service.tracks.len(), 1);
        assert_eq!(service.tracks[0].track_type, TrackType::Prime);
        assert!(service.tracks[0].was_service_approved_before_rejection);

        let division = project_submission(Role::ResponsableDivision, &submission).unwrap();
        assert_eq!(division.tracks.len(), 1);
        assert_eq!(division.tracks[0].track_type, TrackType::Conge);
    }

    #[test]
    fn test_projection_keeps_input_order() {
        let submissions: Vec<_> = (0..5)
            .map(|_| TestSubmissionBuilder::new().with_prime(TrackStatus::Submitted).build())
            .collect();
        let ids: Vec<_> = submissions.iter().map(|s| s.id).collect();

        let queue = project_for_role(Role::ResponsableService, &submissions);
        assert_eq!(queue.iter().map(|v| v.submission_id).collect::<Vec<_>>(), ids);
    }
}

proptest! {
    #[test]
    fn prop_projection_is_pure_and_idempotent(
        prime in status_strategy(),
        conge in status_strategy(),
        role in role_strategy(),
    ) {
        let submissions = vec![pair(prime, conge)];
        let snapshot = submissions.clone();

        let first = project_for_role(role, &submissions);
        let second = project_for_role(role, &submissions);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&submissions, &snapshot);
    }

    #[test]
    fn prop_actionable_means_owner(role in role_strategy(), status in status_strategy()) {
        let actionable = visibility(role, status) == Visibility::Actionable;
        prop_assert_eq!(actionable, owner_of(status) == Some(role));
        prop_assert_eq!(actionable, !available_actions(role, status).is_empty());
    }
}

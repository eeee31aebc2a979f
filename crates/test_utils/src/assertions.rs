//! Custom Test Assertions
//!
//! Assertion helpers for EVP tracks and role queues that report the
//! offending status or queue content on failure.

use domain_evp::{ClaimTrack, ProjectedView, Submission, TrackStatus, TrackType, Visibility};
use core_kernel::SubmissionId;

/// Asserts a track is in `expected`
pub fn assert_track_status(submission: &Submission, track_type: TrackType, expected: TrackStatus) {
    let track = submission
        .track(track_type)
        .unwrap_or_else(|| panic!("submission {} has no {} track", submission.id, track_type));
    assert_eq!(
        track.status, expected,
        "{} track of {} is {}, expected {}",
        track_type, submission.id, track.status, expected
    );
}

/// Asserts a track is byte-for-byte what it was before
///
/// Used to check that a decision on one track leaves its sibling alone.
pub fn assert_track_unchanged(before: &ClaimTrack, after: &ClaimTrack) {
    assert_eq!(
        before, after,
        "{} track changed: {} v{} -> {} v{}",
        before.track_type, before.status, before.version, after.status, after.version
    );
}

/// Asserts the rejection flag of a track
pub fn assert_rejection_flag(track: &ClaimTrack, expected: bool) {
    assert_eq!(
        track.was_service_approved_before_rejection, expected,
        "{} track ({}) rejection flag is {}, expected {}",
        track.track_type, track.status, track.was_service_approved_before_rejection, expected
    );
}

fn queue_entry<'a>(queue: &'a [ProjectedView], id: SubmissionId) -> Option<&'a ProjectedView> {
    queue.iter().find(|view| view.submission_id == id)
}

/// Asserts a track appears in a queue with the given visibility
pub fn assert_in_queue(
    queue: &[ProjectedView],
    id: SubmissionId,
    track_type: TrackType,
    visibility: Visibility,
) {
    let view = queue_entry(queue, id)
        .unwrap_or_else(|| panic!("submission {id} missing from queue"));
    let track = view
        .tracks
        .iter()
        .find(|track| track.track_type == track_type)
        .unwrap_or_else(|| panic!("{track_type} track of {id} missing from queue entry"));
    assert_eq!(
        track.visibility, visibility,
        "{} track of {} has visibility {:?}, expected {:?}",
        track_type, id, track.visibility, visibility
    );
}

/// Asserts a track does not appear in a queue
pub fn assert_not_in_queue(queue: &[ProjectedView], id: SubmissionId, track_type: TrackType) {
    if let Some(view) = queue_entry(queue, id) {
        assert!(
            view.tracks.iter().all(|track| track.track_type != track_type),
            "{} track of {} should not be in this queue",
            track_type,
            id
        );
    }
}

/// Asserts that a result is Ok and returns the value
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Asserts that a result is Err and returns the error
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("Expected Err, got Ok: {:?}", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that an error matches a specific variant
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!("Expected Err matching {}, got Ok({:?})", stringify!($pattern), value),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "Error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::TestSubmissionBuilder;
    use domain_evp::{project_for_role, EvpError, Role};

    #[test]
    fn test_queue_assertions() {
        let submission = TestSubmissionBuilder::new()
            .with_prime(TrackStatus::Submitted)
            .with_conge(TrackStatus::ApprovedByService)
            .build();
        let queue = project_for_role(Role::ResponsableService, &[submission.clone()]);

        assert_in_queue(&queue, submission.id, TrackType::Prime, Visibility::Actionable);
        assert_not_in_queue(&queue, submission.id, TrackType::Conge);
        assert_track_status(&submission, TrackType::Conge, TrackStatus::ApprovedByService);
    }

    #[test]
    fn test_assert_err_variant() {
        let result: Result<(), EvpError> = Err(EvpError::CommentRequired);
        assert_err_variant!(result, EvpError::CommentRequired);
    }

    #[test]
    #[should_panic(expected = "Expected Ok")]
    fn test_assert_ok_panics_on_err() {
        let result: Result<(), EvpError> = Err(EvpError::EmptySubmission);
        assert_ok!(result);
    }
}

//! EVP domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{PortError, SubmissionId};
use crate::role::Role;
use crate::track::{TrackStatus, TrackType};
use crate::transition::Action;

/// Errors returned by the transition engine and the validation service
#[derive(Debug, Error)]
pub enum EvpError {
    #[error("Illegal transition: cannot {action} a track in status {from}")]
    IllegalTransition { from: TrackStatus, action: Action },

    #[error("Unauthorized: {role} {reason}")]
    Unauthorized { role: Role, reason: String },

    #[error("A rejection requires a non-empty comment")]
    CommentRequired,

    #[error("Stale state: {track_type} track of {submission_id} is no longer at version {expected}")]
    StaleState {
        submission_id: SubmissionId,
        track_type: TrackType,
        expected: u64,
    },

    #[error("Track not found: {submission_id} has no {track_type} track")]
    TrackNotFound {
        submission_id: SubmissionId,
        track_type: TrackType,
    },

    #[error("Submission not found: {0}")]
    SubmissionNotFound(SubmissionId),

    #[error("Submission already has a {0} track")]
    DuplicateTrack(TrackType),

    #[error("A submission needs at least one track")]
    EmptySubmission,

    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),

    #[error("Amount of the {track_type} track is locked at {current}, got {requested}")]
    AmountLocked {
        track_type: TrackType,
        current: Decimal,
        requested: Decimal,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl EvpError {
    pub(crate) fn unauthorized_on(role: Role, status: TrackStatus) -> Self {
        EvpError::Unauthorized {
            role,
            reason: format!("cannot act on a track in status {}", status),
        }
    }

    /// Returns true when re-fetching and retrying the command may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, EvpError::StaleState { .. })
    }
}

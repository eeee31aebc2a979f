//! Status transition engine
//!
//! Pure functions over a single [`ClaimTrack`]. The legal moves live in one
//! table ([`next_status`]) and the right to act lives in one lookup
//! ([`owner_of`]); the validation service and the role projector both read
//! from these two functions and nothing else.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use crate::error::EvpError;
use crate::role::Role;
use crate::track::{check_amount, ClaimTrack, TrackStatus};

/// Action requested on a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Submit,
    Resubmit,
    Approve,
    Reject,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Submit, Action::Resubmit, Action::Approve, Action::Reject];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Submit => "submit",
            Action::Resubmit => "resubmit",
            Action::Approve => "approve",
            Action::Reject => "reject",
        }
    }

    pub fn requires_comment(&self) -> bool {
        matches!(self, Action::Reject)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::unknown_variant("action", s))
    }
}

/// Role whose queue holds a track in `status`
///
/// Only this role may act on the track. `None` for the terminal status.
pub fn owner_of(status: TrackStatus) -> Option<Role> {
    match status {
        TrackStatus::Entered | TrackStatus::RejectedByService => Some(Role::Gestionnaire),
        TrackStatus::Submitted | TrackStatus::Resubmitted | TrackStatus::RejectedByDivision => {
            Some(Role::ResponsableService)
        }
        TrackStatus::ApprovedByService => Some(Role::ResponsableDivision),
        TrackStatus::ApprovedByDivision => None,
    }
}

/// The transition table
pub fn next_status(from: TrackStatus, action: Action) -> Option<TrackStatus> {
    use Action::*;
    use TrackStatus::*;

    match (from, action) {
        (Entered, Submit) => Some(Submitted),
        (Submitted | Resubmitted, Approve) => Some(ApprovedByService),
        (Submitted | Resubmitted, Reject) => Some(RejectedByService),
        (ApprovedByService, Approve) => Some(ApprovedByDivision),
        (ApprovedByService, Reject) => Some(RejectedByDivision),
        (RejectedByService, Resubmit) => Some(Resubmitted),
        (RejectedByDivision, Approve) => Some(ApprovedByService),
        (RejectedByDivision, Reject) => Some(RejectedByService),
        _ => None,
    }
}

/// Actions `role` may take on a track in `status`, in table order
pub fn available_actions(role: Role, status: TrackStatus) -> Vec<Action> {
    if owner_of(status) != Some(role) {
        return Vec::new();
    }
    Action::ALL
        .into_iter()
        .filter(|action| next_status(status, *action).is_some())
        .collect()
}

/// A command against one track, already stripped of addressing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCommand {
    pub actor: Role,
    pub action: Action,
    pub comment: Option<String>,
    /// Amount restated by the submitter; must match once the track left `Entered`
    pub amount: Option<Decimal>,
}

impl TrackCommand {
    pub fn new(actor: Role, action: Action) -> Self {
        Self {
            actor,
            action,
            comment: None,
            amount: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Trimmed comment, `None` when blank
    pub fn normalized_comment(&self) -> Option<String> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// Validates `command` against `track` and returns the track it produces
///
/// Checks run in a fixed order: the actor must own the current status, a
/// rejection must carry a comment, the (status, action) pair must be in the
/// table, and a restated amount must be valid and unchanged once submitted.
/// The input track is never modified.
pub fn apply(track: &ClaimTrack, command: &TrackCommand, now: DateTime<Utc>) -> Result<ClaimTrack, EvpError> {
    if owner_of(track.status) != Some(command.actor) {
        return Err(EvpError::unauthorized_on(command.actor, track.status));
    }

    let comment = command.normalized_comment();
    if command.action.requires_comment() && comment.is_none() {
        return Err(EvpError::CommentRequired);
    }

    let to = next_status(track.status, command.action).ok_or(EvpError::IllegalTransition {
        from: track.status,
        action: command.action,
    })?;

    let mut next = track.clone();

    if let Some(amount) = command.amount {
        check_amount(amount)?;
        if track.status == TrackStatus::Entered {
            next.amount = amount;
        } else if amount != track.amount {
            return Err(EvpError::AmountLocked {
                track_type: track.track_type,
                current: track.amount,
                requested: amount,
            });
        }
    }

    match command.action {
        Action::Submit | Action::Resubmit => {
            next.submitted_at = Some(now);
            next.comment = None;
            next.was_service_approved_before_rejection = false;
        }
        Action::Approve => {
            next.comment = None;
            next.was_service_approved_before_rejection = false;
        }
        Action::Reject => {
            next.comment = comment;
            // Only a division rejection sits on top of a service approval
            next.was_service_approved_before_rejection = to == TrackStatus::RejectedByDivision;
        }
    }

    next.status = to;
    next.version = track.version + 1;
    next.updated_at = now;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackType;
    use rust_decimal_macros::dec;

    fn track_in(status: TrackStatus) -> ClaimTrack {
        let mut track = ClaimTrack::draft(TrackType::Prime, dec!(250.00), Utc::now()).unwrap();
        track.status = status;
        track
    }

    #[test]
    fn test_every_status_but_terminal_has_an_owner() {
        for status in TrackStatus::ALL {
            assert_eq!(owner_of(status).is_none(), status.is_terminal());
        }
    }

    #[test]
    fn test_table_only_offers_owner_actions() {
        assert_eq!(
            available_actions(Role::ResponsableService, TrackStatus::RejectedByDivision),
            vec![Action::Approve, Action::Reject]
        );
        assert_eq!(
            available_actions(Role::Gestionnaire, TrackStatus::RejectedByService),
            vec![Action::Resubmit]
        );
        assert!(available_actions(Role::ResponsableDivision, TrackStatus::Submitted).is_empty());
        assert!(available_actions(Role::Rh, TrackStatus::ApprovedByDivision).is_empty());
    }

    #[test]
    fn test_submit_sets_submitted_at_and_bumps_version() {
        let track = track_in(TrackStatus::Entered);
        let now = Utc::now();
        let next = apply(&track, &TrackCommand::new(Role::Gestionnaire, Action::Submit), now).unwrap();

        assert_eq!(next.status, TrackStatus::Submitted);
        assert_eq!(next.submitted_at, Some(now));
        assert_eq!(next.version, track.version + 1);
    }

    #[test]
    fn test_division_rejection_sets_flag() {
        let track = track_in(TrackStatus::ApprovedByService);
        let command = TrackCommand::new(Role::ResponsableDivision, Action::Reject)
            .with_comment("montant incorrect");
        let next = apply(&track, &command, Utc::now()).unwrap();

        assert_eq!(next.status, TrackStatus::RejectedByDivision);
        assert!(next.was_service_approved_before_rejection);
        assert_eq!(next.comment.as_deref(), Some("montant incorrect"));
    }

    #[test]
    fn test_blank_comment_counts_as_missing() {
        let track = track_in(TrackStatus::Submitted);
        let command = TrackCommand::new(Role::ResponsableService, Action::Reject).with_comment("   ");
        assert!(matches!(apply(&track, &command, Utc::now()), Err(EvpError::CommentRequired)));
    }

    #[test]
    fn test_wrong_role_is_unauthorized_before_anything_else() {
        let track = track_in(TrackStatus::Submitted);
        let command = TrackCommand::new(Role::ResponsableDivision, Action::Reject);
        assert!(matches!(
            apply(&track, &command, Utc::now()),
            Err(EvpError::Unauthorized { role: Role::ResponsableDivision, .. })
        ));
    }

    #[test]
    fn test_amount_is_locked_after_entered() {
        let track = track_in(TrackStatus::RejectedByService);
        let command = TrackCommand::new(Role::Gestionnaire, Action::Resubmit).with_amount(dec!(300));
        assert!(matches!(
            apply(&track, &command, Utc::now()),
            Err(EvpError::AmountLocked { .. })
        ));

        let same = TrackCommand::new(Role::Gestionnaire, Action::Resubmit).with_amount(dec!(250.00));
        assert!(apply(&track, &same, Utc::now()).is_ok());
    }

    #[test]
    fn test_amount_can_change_while_entered() {
        let track = track_in(TrackStatus::Entered);
        let command = TrackCommand::new(Role::Gestionnaire, Action::Submit).with_amount(dec!(999.99));
        let next = apply(&track, &command, Utc::now()).unwrap();
        assert_eq!(next.amount, dec!(999.99));
    }
}

//! Submission aggregate
//!
//! A submission groups the claim tracks filed for one employee. It is the
//! consistency boundary for track membership (at most one track per type, at
//! least one track overall) but not for track state: each track is versioned
//! and committed on its own.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{EmployeeId, SubmissionId, UserId};
use crate::error::EvpError;
use crate::track::{ClaimTrack, TrackType};

/// A track the gestionnaire is about to file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDraft {
    pub track_type: TrackType,
    pub amount: Decimal,
}

impl TrackDraft {
    pub fn new(track_type: TrackType, amount: Decimal) -> Self {
        Self { track_type, amount }
    }
}

/// An EVP submission for one employee
///
/// Deserialization goes through [`Submission::from_parts`], so a decoded
/// submission obeys the same membership rules as a freshly opened one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SubmissionRecord")]
pub struct Submission {
    pub id: SubmissionId,
    pub employee_ref: EmployeeId,
    pub submitted_by_ref: UserId,
    prime: Option<ClaimTrack>,
    conge: Option<ClaimTrack>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape of a [`Submission`] before its membership rules are checked
#[derive(Deserialize)]
struct SubmissionRecord {
    id: SubmissionId,
    employee_ref: EmployeeId,
    submitted_by_ref: UserId,
    prime: Option<ClaimTrack>,
    conge: Option<ClaimTrack>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRecord> for Submission {
    type Error = EvpError;

    fn try_from(record: SubmissionRecord) -> Result<Self, Self::Error> {
        let tracks = record.prime.into_iter().chain(record.conge).collect();
        Submission::from_parts(
            record.id,
            record.employee_ref,
            record.submitted_by_ref,
            record.created_at,
            tracks,
        )
    }
}

impl Submission {
    /// Opens a submission with one `Entered` track per draft
    pub fn open(
        employee_ref: EmployeeId,
        submitted_by_ref: UserId,
        drafts: &[TrackDraft],
        now: DateTime<Utc>,
    ) -> Result<Self, EvpError> {
        let tracks = drafts
            .iter()
            .map(|draft| ClaimTrack::draft(draft.track_type, draft.amount, now))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_parts(SubmissionId::new(), employee_ref, submitted_by_ref, now, tracks)
    }

    /// Rebuilds a submission from stored tracks, re-checking membership rules
    pub fn from_parts(
        id: SubmissionId,
        employee_ref: EmployeeId,
        submitted_by_ref: UserId,
        created_at: DateTime<Utc>,
        tracks: Vec<ClaimTrack>,
    ) -> Result<Self, EvpError> {
        if tracks.is_empty() {
            return Err(EvpError::EmptySubmission);
        }

        let mut submission = Self {
            id,
            employee_ref,
            submitted_by_ref,
            prime: None,
            conge: None,
            created_at,
        };
        for track in tracks {
            let slot = submission.slot_mut(track.track_type);
            if slot.is_some() {
                return Err(EvpError::DuplicateTrack(track.track_type));
            }
            *slot = Some(track);
        }
        Ok(submission)
    }

    pub fn track(&self, track_type: TrackType) -> Option<&ClaimTrack> {
        match track_type {
            TrackType::Prime => self.prime.as_ref(),
            TrackType::Conge => self.conge.as_ref(),
        }
    }

    /// Like [`Submission::track`] but fails with `TrackNotFound`
    pub fn require_track(&self, track_type: TrackType) -> Result<&ClaimTrack, EvpError> {
        self.track(track_type).ok_or(EvpError::TrackNotFound {
            submission_id: self.id,
            track_type,
        })
    }

    /// Present tracks, Prime first
    pub fn tracks(&self) -> impl Iterator<Item = &ClaimTrack> {
        self.prime.iter().chain(self.conge.iter())
    }

    /// Adds the missing sibling track in `Entered` status
    pub fn attach_track(
        &mut self,
        track_type: TrackType,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<&ClaimTrack, EvpError> {
        if self.track(track_type).is_some() {
            return Err(EvpError::DuplicateTrack(track_type));
        }
        let track = ClaimTrack::draft(track_type, amount, now)?;
        let attached = self.slot_mut(track_type).insert(track);
        Ok(&*attached)
    }

    /// Swaps in a new state for an existing track
    ///
    /// Only the slot matching `track.track_type` is touched.
    pub fn replace_track(&mut self, track: ClaimTrack) -> Result<(), EvpError> {
        let track_type = track.track_type;
        let id = self.id;
        match self.slot_mut(track_type) {
            Some(current) => {
                *current = track;
                Ok(())
            }
            None => Err(EvpError::TrackNotFound {
                submission_id: id,
                track_type,
            }),
        }
    }

    fn slot_mut(&mut self, track_type: TrackType) -> &mut Option<ClaimTrack> {
        match track_type {
            TrackType::Prime => &mut self.prime,
            TrackType::Conge => &mut self.conge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open(drafts: &[TrackDraft]) -> Result<Submission, EvpError> {
        Submission::open(EmployeeId::new(), UserId::new(), drafts, Utc::now())
    }

    #[test]
    fn test_open_requires_a_track() {
        assert!(matches!(open(&[]), Err(EvpError::EmptySubmission)));
    }

    #[test]
    fn test_open_rejects_duplicate_track_types() {
        let drafts = [
            TrackDraft::new(TrackType::Prime, dec!(10)),
            TrackDraft::new(TrackType::Prime, dec!(20)),
        ];
        assert!(matches!(open(&drafts), Err(EvpError::DuplicateTrack(TrackType::Prime))));
    }

    #[test]
    fn test_attach_sibling_later() {
        let mut submission = open(&[TrackDraft::new(TrackType::Conge, dec!(80))]).unwrap();
        assert!(submission.track(TrackType::Prime).is_none());

        submission.attach_track(TrackType::Prime, dec!(1200), Utc::now()).unwrap();
        let types: Vec<_> = submission.tracks().map(|t| t.track_type).collect();
        assert_eq!(types, vec![TrackType::Prime, TrackType::Conge]);

        assert!(submission.attach_track(TrackType::Conge, dec!(1), Utc::now()).is_err());
    }

    #[test]
    fn test_replace_track_leaves_sibling_untouched() {
        let drafts = [
            TrackDraft::new(TrackType::Prime, dec!(500)),
            TrackDraft::new(TrackType::Conge, dec!(75)),
        ];
        let mut submission = open(&drafts).unwrap();
        let conge_before = submission.track(TrackType::Conge).cloned();

        let mut prime = submission.track(TrackType::Prime).cloned().unwrap();
        prime.version = 3;
        submission.replace_track(prime).unwrap();

        assert_eq!(submission.track(TrackType::Prime).map(|t| t.version), Some(3));
        assert_eq!(submission.track(TrackType::Conge).cloned(), conge_before);
    }

    #[test]
    fn test_require_track_reports_missing_type() {
        let submission = open(&[TrackDraft::new(TrackType::Prime, dec!(1))]).unwrap();
        assert!(matches!(
            submission.require_track(TrackType::Conge),
            Err(EvpError::TrackNotFound { track_type: TrackType::Conge, .. })
        ));
    }

    #[test]
    fn test_deserialize_enforces_membership_rules() {
        let submission = open(&[TrackDraft::new(TrackType::Prime, dec!(40))]).unwrap();
        let mut json = serde_json::to_value(&submission).unwrap();

        let decoded: Submission = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(decoded, submission);

        json["prime"] = serde_json::Value::Null;
        assert!(serde_json::from_value::<Submission>(json.clone()).is_err());

        let prime = serde_json::to_value(submission.track(TrackType::Prime)).unwrap();
        json["prime"] = prime.clone();
        json["conge"] = prime;
        assert!(serde_json::from_value::<Submission>(json).is_err());
    }
}

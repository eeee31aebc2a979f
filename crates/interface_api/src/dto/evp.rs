//! EVP DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use core_kernel::{EmployeeId, SubmissionId, UserId};
use domain_evp::track::AMOUNT_SCALE;
use domain_evp::transition::Action;
use domain_evp::{ClaimTrack, Submission, TrackDraft, TrackType};

/// Largest amount accepted on a single track
const MAX_TRACK_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 2);

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        return Err(ValidationError::new("negative_amount"));
    }
    if *amount > MAX_TRACK_AMOUNT {
        return Err(ValidationError::new("amount_too_large"));
    }
    if amount.scale() > AMOUNT_SCALE {
        return Err(ValidationError::new("too_many_decimal_places"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackDraftRequest {
    pub track_type: TrackType,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
}

impl From<&TrackDraftRequest> for TrackDraft {
    fn from(request: &TrackDraftRequest) -> Self {
        TrackDraft::new(request.track_type, request.amount)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpenSubmissionRequest {
    pub employee_ref: Uuid,
    #[validate(length(min = 1, max = 2), nested)]
    pub tracks: Vec<TrackDraftRequest>,
}

impl OpenSubmissionRequest {
    pub fn employee(&self) -> EmployeeId {
        EmployeeId::from_uuid(self.employee_ref)
    }

    pub fn drafts(&self) -> Vec<TrackDraft> {
        self.tracks.iter().map(TrackDraft::from).collect()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DecisionRequest {
    pub action: Action,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    pub expected_version: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: SubmissionId,
    pub employee_ref: EmployeeId,
    pub submitted_by_ref: UserId,
    pub created_at: DateTime<Utc>,
    pub tracks: Vec<ClaimTrack>,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            employee_ref: submission.employee_ref,
            submitted_by_ref: submission.submitted_by_ref,
            created_at: submission.created_at,
            tracks: submission.tracks().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_open_request_needs_one_or_two_tracks() {
        let empty = OpenSubmissionRequest {
            employee_ref: Uuid::now_v7(),
            tracks: vec![],
        };
        assert!(empty.validate().is_err());

        let one = OpenSubmissionRequest {
            employee_ref: Uuid::now_v7(),
            tracks: vec![TrackDraftRequest { track_type: TrackType::Prime, amount: dec!(10) }],
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_negative_amount_fails_validation() {
        let request = SubmitClaimRequest {
            amount: dec!(-5),
            expected_version: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_decision_request_parses_snake_case_action() {
        let request: DecisionRequest =
            serde_json::from_str(r#"{"action":"reject","comment":"dates invalides"}"#).unwrap();
        assert_eq!(request.action, Action::Reject);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_sub_cent_amount_fails_validation() {
        let request = SubmitClaimRequest {
            amount: dec!(10.005),
            expected_version: None,
        };
        assert!(request.validate().is_err());

        let open: OpenSubmissionRequest = serde_json::from_str(&format!(
            r#"{{"employee_ref":"{}","tracks":[{{"track_type":"prime","amount":"10.005"}}]}}"#,
            Uuid::now_v7()
        ))
        .unwrap();
        assert!(open.validate().is_err());

        let whole = SubmitClaimRequest {
            amount: dec!(10.00),
            expected_version: None,
        };
        assert!(whole.validate().is_ok());
    }
}

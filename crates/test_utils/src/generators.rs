//! Property-Based Test Generators
//!
//! Proptest strategies over the EVP vocabulary.

use domain_evp::transition::Action;
use domain_evp::{ClaimTrack, Role, TrackStatus, TrackType};
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::builders::drive_track;

pub fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

pub fn action_strategy() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

pub fn status_strategy() -> impl Strategy<Value = TrackStatus> {
    prop::sample::select(TrackStatus::ALL.to_vec())
}

pub fn track_type_strategy() -> impl Strategy<Value = TrackType> {
    prop::sample::select(TrackType::ALL.to_vec())
}

/// Non-negative amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Comments, including blank and whitespace-only ones
pub fn comment_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some("  \t ".to_string())),
        "[a-zA-Z][a-zA-Z ]{0,40}".prop_map(Some),
    ]
}

/// A track of any type and amount driven to any status
pub fn track_strategy() -> impl Strategy<Value = ClaimTrack> {
    (track_type_strategy(), amount_strategy(), status_strategy()).prop_map(
        |(track_type, amount, status)| {
            let entered = ClaimTrack::draft(track_type, amount, chrono::Utc::now())
                .expect("generated amounts are non-negative");
            drive_track(&entered, status)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_amounts_are_non_negative(amount in amount_strategy()) {
            prop_assert!(amount >= Decimal::ZERO);
        }

        #[test]
        fn test_generated_tracks_are_consistent(track in track_strategy()) {
            prop_assert_eq!(track.submitted_at.is_none(), track.status == TrackStatus::Entered);
        }
    }
}

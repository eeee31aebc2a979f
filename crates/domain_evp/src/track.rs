//! Claim tracks
//!
//! A claim track is the approval state of one claim type (Prime or Congé)
//! within one submission. Tracks are versioned independently so the two
//! tracks of a submission never contend with each other.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::CoreError;
use crate::error::EvpError;

/// Kind of claim carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackType {
    /// Performance bonus
    Prime,
    /// Paid-leave compensation
    Conge,
}

impl TrackType {
    pub const ALL: [TrackType; 2] = [TrackType::Prime, TrackType::Conge];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Prime => "prime",
            TrackType::Conge => "conge",
        }
    }

    /// The other track type of a submission
    pub fn sibling(&self) -> TrackType {
        match self {
            TrackType::Prime => TrackType::Conge,
            TrackType::Conge => TrackType::Prime,
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prime" => Ok(TrackType::Prime),
            "conge" | "congé" => Ok(TrackType::Conge),
            _ => Err(CoreError::unknown_variant("track type", s)),
        }
    }
}

/// Approval status of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    /// Being composed by the gestionnaire
    Entered,
    /// Submitted for the first time
    Submitted,
    /// Submitted again after a service rejection
    Resubmitted,
    /// First-tier approval granted
    ApprovedByService,
    /// Second-tier approval granted, exportable to payroll
    ApprovedByDivision,
    /// Rejected by the service, back with the gestionnaire
    RejectedByService,
    /// Rejected by the division, back with the service
    RejectedByDivision,
}

impl TrackStatus {
    pub const ALL: [TrackStatus; 7] = [
        TrackStatus::Entered,
        TrackStatus::Submitted,
        TrackStatus::Resubmitted,
        TrackStatus::ApprovedByService,
        TrackStatus::ApprovedByDivision,
        TrackStatus::RejectedByService,
        TrackStatus::RejectedByDivision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackStatus::Entered => "entered",
            TrackStatus::Submitted => "submitted",
            TrackStatus::Resubmitted => "resubmitted",
            TrackStatus::ApprovedByService => "approved_by_service",
            TrackStatus::ApprovedByDivision => "approved_by_division",
            TrackStatus::RejectedByService => "rejected_by_service",
            TrackStatus::RejectedByDivision => "rejected_by_division",
        }
    }

    /// Normalized status shown in HR reporting
    ///
    /// Does not distinguish where a rejection happened.
    pub fn display_status(&self) -> DisplayStatus {
        match self {
            TrackStatus::ApprovedByService | TrackStatus::ApprovedByDivision => {
                DisplayStatus::Validated
            }
            TrackStatus::RejectedByService | TrackStatus::RejectedByDivision => {
                DisplayStatus::Rejected
            }
            TrackStatus::Entered | TrackStatus::Submitted | TrackStatus::Resubmitted => {
                DisplayStatus::Pending
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackStatus::ApprovedByDivision)
    }
}

impl fmt::Display for TrackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| CoreError::unknown_variant("track status", s))
    }
}

/// Three-way status used by HR reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Validated,
    Rejected,
    Pending,
}

impl DisplayStatus {
    /// Label used on reports
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Validated => "Validated",
            DisplayStatus::Rejected => "Rejected",
            DisplayStatus::Pending => "Submitted/Pending",
        }
    }
}

/// Approval state of one claim type within a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTrack {
    /// Claim type
    pub track_type: TrackType,
    /// Current approval status
    pub status: TrackStatus,
    /// Amount computed by the submission layer, locked once submitted
    pub amount: Decimal,
    /// Time of the latest (re)submission
    pub submitted_at: Option<DateTime<Utc>>,
    /// Comment left by the rejecting actor
    pub comment: Option<String>,
    /// True when the division rejected after a service approval
    pub was_service_approved_before_rejection: bool,
    /// Optimistic concurrency version, bumped on every committed transition
    pub version: u64,
    /// Time of the last committed change
    pub updated_at: DateTime<Utc>,
}

/// Decimal places kept for amounts, matching the storage column
pub const AMOUNT_SCALE: u32 = 2;

/// Amounts are non-negative with at most [`AMOUNT_SCALE`] decimal places
pub(crate) fn check_amount(amount: Decimal) -> Result<(), EvpError> {
    if amount < Decimal::ZERO || amount.scale() > AMOUNT_SCALE {
        return Err(EvpError::InvalidAmount(amount));
    }
    Ok(())
}

impl ClaimTrack {
    /// Creates a track in `Entered` status at version 0
    pub fn draft(track_type: TrackType, amount: Decimal, now: DateTime<Utc>) -> Result<Self, EvpError> {
        check_amount(amount)?;
        Ok(Self {
            track_type,
            status: TrackStatus::Entered,
            amount,
            submitted_at: None,
            comment: None,
            was_service_approved_before_rejection: false,
            version: 0,
            updated_at: now,
        })
    }

    pub fn display_status(&self) -> DisplayStatus {
        self.status.display_status()
    }

    /// True once the track can be sent to payroll
    pub fn is_exportable(&self) -> bool {
        self.status.is_terminal()
    }
}

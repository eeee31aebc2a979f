//! EVP Approval Domain
//!
//! This crate implements the approval workflow for payroll-adjustment claims
//! ("EVP"): performance bonuses (Prime) and paid-leave compensation (Congé).
//! A submission carries up to two independent claim tracks, and each track
//! moves through a two-tier approval chain before HR can export it.
//!
//! # Track Lifecycle
//!
//! ```text
//!                 submit                approve (Service)         approve (Division)
//! Entered ──────────────▶ Submitted ──────────────▶ ApprovedByService ──────────────▶ ApprovedByDivision
//!                          │    ▲                      ▲        │
//!          reject (Service)│    │ (same as Submitted)  │        │ reject (Division)
//!                          ▼    │                      │        ▼
//!              RejectedByService ──▶ Resubmitted   approve ◀── RejectedByDivision
//!                     ▲             (resubmit)    (Service)          │
//!                     └────────────────────────────────────────────┘
//!                                    reject (Service)
//! ```
//!
//! Writes go through [`ValidationService`]; reads go through the pure
//! [`projector`] functions.

pub mod role;
pub mod track;
pub mod transition;
pub mod submission;
pub mod events;
pub mod projector;
pub mod reporting;
pub mod ports;
pub mod adapters;
pub mod service;
pub mod error;

pub use role::Role;
pub use track::{ClaimTrack, TrackType, TrackStatus, DisplayStatus};
pub use transition::{Action, TrackCommand};
pub use submission::{Submission, TrackDraft};
pub use events::TrackEvent;
pub use projector::{project_for_role, project_track, ProjectedView, TrackProjection, Visibility};
pub use reporting::{ExportedTrack, ReportingSummary, TrackTypeSummary};
pub use ports::SubmissionPort;
pub use adapters::InMemorySubmissionPort;
pub use service::{ValidationService, DecideCommand, SubmitClaim};
pub use error::EvpError;

//! Pre-built Test Fixtures
//!
//! Consistent, predictable data for unit tests.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{EmployeeId, SubmissionId, UserId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for amounts
pub struct AmountFixtures;

impl AmountFixtures {
    /// A typical performance bonus
    pub fn prime() -> Decimal {
        dec!(1500.00)
    }

    /// A typical paid-leave compensation
    pub fn conge() -> Decimal {
        dec!(320.50)
    }

    pub fn zero() -> Decimal {
        Decimal::ZERO
    }

    pub fn negative() -> Decimal {
        dec!(-10.00)
    }
}

/// Fixture for rejection comments
pub struct CommentFixtures;

impl CommentFixtures {
    pub fn division_rejection() -> &'static str {
        "montant incorrect"
    }

    pub fn service_rejection() -> &'static str {
        "dates invalides"
    }

    pub fn blank() -> &'static str {
        "   "
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn employee() -> EmployeeId {
        EmployeeId::from_uuid(fixed_uuid(1))
    }

    pub fn gestionnaire_user() -> UserId {
        UserId::from_uuid(fixed_uuid(2))
    }

    /// A submission id no store knows about
    pub fn unknown_submission() -> SubmissionId {
        SubmissionId::from_uuid(fixed_uuid(0xdead))
    }
}

/// Fixture for timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Start of the payroll period used in tests (Jan 1, 2025)
    pub fn period_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Deterministic v7-shaped UUID from a small integer
fn fixed_uuid(n: u128) -> Uuid {
    Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0000 | n)
}

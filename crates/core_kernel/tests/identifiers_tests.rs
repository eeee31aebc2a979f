//! Unit tests for the identifier newtypes
//!
//! Covers creation, parsing, conversion, ordering and serialization.

use core_kernel::{SubmissionId, EmployeeId, UserId, AuditEventId};
use proptest::prelude::*;
use uuid::Uuid;

mod submission_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = SubmissionId::new();
        let id2 = SubmissionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_is_time_ordered() {
        let id1 = SubmissionId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = SubmissionId::new();
        assert!(id1 < id2);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(SubmissionId::prefix(), "EVP");
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = SubmissionId::new();
        let parsed: SubmissionId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("EVP-not-a-uuid".parse::<SubmissionId>().is_err());
    }

    #[test]
    fn test_json_is_a_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = SubmissionId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
        let back: SubmissionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}

mod reference_id_tests {
    use super::*;

    #[test]
    fn test_prefixes_are_distinct() {
        assert_eq!(EmployeeId::prefix(), "EMP");
        assert_eq!(UserId::prefix(), "USR");
        assert_eq!(AuditEventId::prefix(), "AUD");
    }

    #[test]
    fn test_employee_display() {
        let id = EmployeeId::new();
        assert!(id.to_string().starts_with("EMP-"));
    }

    #[test]
    fn test_user_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id: UserId = uuid.into();
        assert_eq!(*id.as_uuid(), uuid);
    }
}

proptest! {
    #[test]
    fn prop_display_parses_back(bits in any::<u128>()) {
        let id = EmployeeId::from_uuid(Uuid::from_u128(bits));
        let parsed: EmployeeId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }
}

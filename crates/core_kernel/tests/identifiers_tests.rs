//! Unit tests for the Identifiers module
//!
//! Covers UUID-backed identifiers and the person identity sequence.

use core_kernel::{IdentitySequence, InquiryId, LocationId, PersonId, SupplyId};
use proptest::prelude::*;
use uuid::Uuid;

mod uuid_ids {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = LocationId::new();
        let id2 = LocationId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(LocationId::prefix(), "LOC");
        assert_eq!(SupplyId::prefix(), "SUP");
        assert_eq!(InquiryId::prefix(), "INQ");
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: InquiryId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_rejects_garbage() {
        assert!("LOC-not-a-uuid".parse::<LocationId>().is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = SupplyId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}

mod identity_sequence {
    use super::*;

    #[test]
    fn test_fresh_sequences_are_independent() {
        let a = IdentitySequence::new();
        let b = IdentitySequence::new();
        assert_eq!(a.next_id().value(), 1);
        assert_eq!(b.next_id().value(), 1);
        assert_eq!(a.next_id().value(), 2);
    }

    #[test]
    fn test_person_id_serializes_as_number() {
        let seq = IdentitySequence::new();
        let id: PersonId = seq.next_id();
        assert_eq!(serde_json::to_string(&id).unwrap(), "1");
    }

    proptest! {
        #[test]
        fn prop_sequence_strictly_increases(count in 1usize..500) {
            let seq = IdentitySequence::new();
            let ids: Vec<PersonId> = (0..count).map(|_| seq.next_id()).collect();
            for pair in ids.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            prop_assert_eq!(ids.first().map(|id| id.value()), Some(1));
            prop_assert_eq!(seq.last_issued(), ids.last().copied());
        }
    }
}

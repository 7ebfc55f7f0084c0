//! Integration tests for the relief domain
//!
//! Tests cover person registration, family membership, supply allocation,
//! water expiry and inquiries driven through the registry.

use chrono::Days;
use core_kernel::IdentitySequence;
use domain_relief::{Holder, Inquiry, Location, MedicalRecord, Person, ReliefError, Supply};
use proptest::prelude::*;
use test_utils::{
    assert_family_groups_consistent, assert_held_by, assert_no_expired_water,
    entry_and_birth_strategy, first_name_strategy, gender_strategy, last_name_strategy,
    malformed_date_strategy, registry_on, supply_strategy, DateFixtures, InquirerFixtures,
    InquiryBuilder, LocationFixtures, PersonBuilder, PersonFixtures,
};

mod persons {
    use super::*;

    #[test]
    fn test_freda_is_registered() {
        let (mut registry, _) = registry_on(DateFixtures::intake_start());
        let id = registry.adopt_person(PersonFixtures::freda(&registry)).unwrap();

        let freda = registry.person(id).unwrap();
        assert_eq!(freda.entry_date(), DateFixtures::intake_start());
        assert_eq!(freda.last_name(), None);
    }

    #[test]
    fn test_described_adult_keeps_every_field() {
        let (mut registry, _) = registry_on(DateFixtures::inquiry_day());
        let id = registry.adopt_person(PersonFixtures::jane_alex(&registry)).unwrap();

        let jane = registry.find_person_by_name("Jane", Some("Alex")).unwrap();
        assert_eq!(jane.id(), id);
        assert_eq!(jane.date_of_birth(), Some(DateFixtures::ymd(1990, 6, 1)));
        assert_eq!(jane.gender().map(|g| g.as_str()), Some("female"));
    }

    #[test]
    fn test_malformed_entry_date_creates_nothing() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let result = Person::with_date_of_birth(registry.ids(), "Fang", "20250112", "2017-03-20");

        let err = result.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(registry.ids().last_issued(), None);

        let next = registry.register_person("Freda", "2025-01-18").unwrap();
        assert_eq!(next.value(), 1);
    }

    #[test]
    fn test_adopt_rejects_duplicates() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let first = Person::new(registry.ids(), "Freda", "2025-01-18").unwrap();
        let id = registry.adopt_person(first).unwrap();
        assert!(registry.person(id).is_some());

        let ids = IdentitySequence::new();
        let clash = Person::new(&ids, "Other", "2025-01-18").unwrap();
        assert_eq!(
            registry.adopt_person(clash).unwrap_err(),
            ReliefError::DuplicatePerson(id)
        );
    }

    #[test]
    fn test_find_by_name_matches_absent_last_name() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let jane = registry.register_person("Jane", "2025-01-18").unwrap();
        let other = registry.register_person("Jane", "2025-01-18").unwrap();
        registry
            .person_mut(other)
            .unwrap()
            .set_last_name(Some("Alex".to_string()));

        assert_eq!(registry.find_person_by_name("Jane", None).unwrap().id(), jane);
        assert_eq!(
            registry.find_person_by_name("Jane", Some("Alex")).unwrap().id(),
            other
        );
    }

    proptest! {
        #[test]
        fn prop_valid_dates_round_trip((entry, birth) in entry_and_birth_strategy()) {
            let ids = IdentitySequence::new();
            let person = Person::with_date_of_birth(
                &ids,
                "Freda",
                &entry.to_string(),
                &birth.to_string(),
            )
            .unwrap();

            prop_assert_eq!(person.entry_date(), entry);
            prop_assert_eq!(person.date_of_birth(), Some(birth));
        }

        #[test]
        fn prop_malformed_entry_date_draws_no_id(entry in malformed_date_strategy()) {
            let (registry, _) = registry_on(DateFixtures::intake_start());
            let err = PersonBuilder::new("Fang").entry_date(entry).build(&registry).unwrap_err();

            prop_assert!(err.is_validation());
            prop_assert_eq!(registry.ids().last_issued(), None);
        }

        #[test]
        fn prop_gender_accepted_in_any_case(token in gender_strategy()) {
            let (registry, _) = registry_on(DateFixtures::intake_start());
            let person = PersonBuilder::new("Alex").gender(token.clone()).build(&registry).unwrap();
            let lower = token.to_ascii_lowercase();
            prop_assert_eq!(person.gender().map(|g| g.as_str()), Some(lower.as_str()));
        }

        #[test]
        fn prop_find_by_exact_name(first in first_name_strategy(), last in last_name_strategy()) {
            let (mut registry, _) = registry_on(DateFixtures::intake_start());
            let mut builder = PersonBuilder::new(first.clone());
            if let Some(last) = &last {
                builder = builder.last_name(last.clone());
            }
            let id = builder.register(&mut registry).unwrap();
            PersonBuilder::random().register(&mut registry).unwrap();

            let found = registry.find_person_by_name(&first, last.as_deref()).map(|p| p.id());
            prop_assert_eq!(found, Some(id));
        }

        #[test]
        fn prop_ids_strictly_increase(count in 1usize..50) {
            let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
            let ids: Vec<_> = (0..count)
                .map(|_| registry.register_person("Freda", "2025-01-18").unwrap())
                .collect();
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

mod family_groups {
    use super::*;

    #[test]
    fn test_member_ends_up_in_latest_group_only() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        for group in ["North", "South", "East"] {
            registry.create_family_group(group).unwrap();
            registry.add_family_member(group, person).unwrap();
        }

        let holding: Vec<_> = registry
            .family_groups()
            .filter(|g| g.contains(person))
            .map(|g| g.id().to_string())
            .collect();
        assert_eq!(holding, vec!["East".to_string()]);
        assert_family_groups_consistent(&registry);
    }

    #[test]
    fn test_builder_registration_joins_group() {
        let (mut registry, _) = registry_on(DateFixtures::intake_start());
        let ana = PersonBuilder::new("Ana")
            .family_group("F7")
            .register(&mut registry)
            .unwrap();
        let ben = PersonBuilder::new("Ben")
            .family_group("F7")
            .register(&mut registry)
            .unwrap();

        assert_eq!(registry.family_of(ana).unwrap().size(), 2);
        assert!(registry.family_group("F7").unwrap().contains(ben));
        assert_family_groups_consistent(&registry);
    }

    #[test]
    fn test_remove_group_clears_members() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let a = registry.register_person("Freda", "2025-01-18").unwrap();
        let b = registry.register_person("Jane", "2025-01-18").unwrap();
        registry.create_family_group("Smith").unwrap();
        registry.add_family_member("Smith", a).unwrap();
        registry.add_family_member("Smith", b).unwrap();

        let removed = registry.remove_family_group("Smith").unwrap();

        assert_eq!(removed.size(), 2);
        assert_eq!(registry.person(a).unwrap().family_group(), None);
        assert_eq!(registry.person(b).unwrap().family_group(), None);
        assert_family_groups_consistent(&registry);
    }

    #[test]
    fn test_unknown_group_is_not_found() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        assert!(registry
            .add_family_member("Nobody", person)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        registry.create_family_group("Smith").unwrap();
        assert!(registry.create_family_group("Smith").unwrap_err().is_validation());
    }

    #[test]
    fn test_remove_member_reports_absence() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 20));
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        registry.create_family_group("Smith").unwrap();
        assert!(!registry.remove_family_member("Smith", person).unwrap());

        registry.add_family_member("Smith", person).unwrap();
        assert!(registry.remove_family_member("Smith", person).unwrap());
        assert!(registry.family_of(person).is_none());
    }
}

mod allocation {
    use super::*;

    #[test]
    fn test_water_expiry_on_simulated_calendar() {
        let (mut registry, clock) = registry_on(DateFixtures::ymd(2025, 1, 1));
        let person = registry.register_person("Freda", "2025-01-01").unwrap();
        let water = registry.add_stock(Supply::water(1));

        let event = registry
            .allocate(water, Holder::Unowned, Holder::Person(person))
            .unwrap();
        assert_eq!(event.date, DateFixtures::ymd(2025, 1, 1));

        let held = registry.supply(water).unwrap();
        assert!(!held.is_expired(DateFixtures::ymd(2025, 1, 1)));
        assert!(!held.is_expired(DateFixtures::ymd(2025, 1, 2)));
        assert!(held.is_expired(DateFixtures::ymd(2025, 1, 3)));

        clock.set(DateFixtures::ymd(2025, 1, 2));
        assert!(registry.sweep_expired_water(person).unwrap().is_empty());

        clock.set(DateFixtures::ymd(2025, 1, 3));
        let dropped = registry.sweep_expired_water(person).unwrap();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].id(), water);
        assert!(registry.locate_supply(water).is_none());
        assert_no_expired_water(&registry, DateFixtures::ymd(2025, 1, 3));
    }

    #[test]
    fn test_sweep_preserves_order_of_remaining() {
        let (mut registry, clock) = registry_on(DateFixtures::ymd(2025, 1, 1));
        let person = registry.register_person("Freda", "2025-01-01").unwrap();
        let blanket = registry.add_stock(Supply::general("Blanket", 1));
        let water = registry.add_stock(Supply::water(1));
        let bag = registry.add_stock(Supply::personal_belonging("Red backpack"));
        for id in [blanket, water, bag] {
            registry
                .allocate(id, Holder::Unowned, Holder::Person(person))
                .unwrap();
        }

        clock.advance_days(5);
        let dropped = registry.sweep_all_expired_water();

        assert_eq!(dropped.len(), 1);
        assert_no_expired_water(&registry, DateFixtures::ymd(2025, 1, 6));
        let remaining: Vec<_> = registry
            .person(person)
            .unwrap()
            .supplies()
            .iter()
            .map(Supply::id)
            .collect();
        assert_eq!(remaining, vec![blanket, bag]);
    }

    #[test]
    fn test_water_date_cleared_at_location() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 1));
        let person = registry.register_person("Freda", "2025-01-01").unwrap();
        let shelter = registry.add_location(LocationFixtures::community_centre());
        let water = registry.add_stock(Supply::water(2));

        registry
            .allocate(water, Holder::Unowned, Holder::Person(person))
            .unwrap();
        registry
            .allocate(water, Holder::Person(person), Holder::Location(shelter))
            .unwrap();

        let stored = registry.supply(water).unwrap();
        assert_eq!(stored.allocation_date(), None);
        assert_held_by(&registry, water, Holder::Location(shelter));
    }

    #[test]
    fn test_personal_belonging_never_reaches_location() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 1));
        let shelter = registry.add_location(Location::new("Shelter A", "123 Main St"));
        let bag = registry.add_stock(Supply::personal_belonging("Green leather suitcase"));

        let err = registry
            .allocate(bag, Holder::Unowned, Holder::Location(shelter))
            .unwrap_err();

        assert!(matches!(err, ReliefError::PlacementRejected { .. }));
        assert!(registry.location(shelter).unwrap().supplies().is_empty());
        assert_held_by(&registry, bag, Holder::Unowned);
    }

    #[test]
    fn test_person_to_person_is_illegal() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 1));
        let a = registry.register_person("Freda", "2025-01-01").unwrap();
        let b = registry.register_person("Jane", "2025-01-01").unwrap();
        let cot = registry.add_stock(Supply::cot("115", "B6", 1).unwrap());
        registry.allocate(cot, Holder::Unowned, Holder::Person(a)).unwrap();

        let err = registry
            .allocate(cot, Holder::Person(a), Holder::Person(b))
            .unwrap_err();

        assert!(matches!(err, ReliefError::IllegalTransfer { .. }));
        assert_held_by(&registry, cot, Holder::Person(a));
    }

    #[test]
    fn test_missing_unit_is_not_found() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 1));
        let person = registry.register_person("Freda", "2025-01-01").unwrap();
        let shelter = registry.add_location(Location::new("Shelter A", "123 Main St"));
        let cot = registry.add_stock(Supply::cot("115", "B6", 1).unwrap());

        let err = registry
            .allocate(cot, Holder::Location(shelter), Holder::Person(person))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_held_by(&registry, cot, Holder::Unowned);
    }

    proptest! {
        #[test]
        fn prop_belongings_rejected_at_any_location(description in "[a-zA-Z ]{0,30}", stored in 0usize..5) {
            let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 1, 1));
            let shelter = registry.add_location(Location::new("Shelter A", "123 Main St"));
            for _ in 0..stored {
                let cot = registry.add_stock(Supply::cot("1", "A1", 1).unwrap());
                registry.allocate(cot, Holder::Unowned, Holder::Location(shelter)).unwrap();
            }
            let before: Vec<_> = registry
                .location(shelter)
                .unwrap()
                .supplies()
                .iter()
                .map(Supply::id)
                .collect();

            let bag = registry.add_stock(Supply::personal_belonging(description));
            let result = registry.allocate(bag, Holder::Unowned, Holder::Location(shelter));

            prop_assert!(result.is_err());
            let after: Vec<_> = registry
                .location(shelter)
                .unwrap()
                .supplies()
                .iter()
                .map(Supply::id)
                .collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn prop_location_accepts_only_locatable(supply in supply_strategy()) {
            let (mut registry, _) = registry_on(DateFixtures::intake_start());
            let shelter = registry.add_location(LocationFixtures::university_of_calgary());
            let locatable = supply.is_locatable();
            let id = registry.add_stock(supply);

            let result = registry.allocate(id, Holder::Unowned, Holder::Location(shelter));

            prop_assert_eq!(result.is_ok(), locatable);
            let expected = if locatable { Holder::Location(shelter) } else { Holder::Unowned };
            assert_held_by(&registry, id, expected);
        }

        #[test]
        fn prop_water_expiry_boundary(offset in 0u64..10) {
            let allocated = DateFixtures::ymd(2025, 1, 1);
            let (mut registry, _) = registry_on(allocated);
            let person = registry.register_person("Freda", "2025-01-01").unwrap();
            let water = registry.add_stock(Supply::water(1));
            registry.allocate(water, Holder::Unowned, Holder::Person(person)).unwrap();

            let today = allocated.checked_add_days(Days::new(offset)).unwrap();
            let held = registry.supply(water).unwrap();
            prop_assert_eq!(held.is_expired(today), offset >= 2);
        }
    }
}

mod records_and_inquiries {
    use super::*;

    #[test]
    fn test_medical_records_keep_insertion_order() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 2, 1));
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        let clinic = registry.add_location(Location::new("Clinic", "1 Health Way"));

        for details in ["Splint", "Stitches", "Checkup"] {
            let record = MedicalRecord::new(clinic, "2025-01-20", details).unwrap();
            registry.add_medical_record(person, record).unwrap();
        }

        let details: Vec<_> = registry
            .person(person)
            .unwrap()
            .medical_records()
            .iter()
            .map(|r| r.treatment_details().to_string())
            .collect();
        assert_eq!(details, vec!["Splint", "Stitches", "Checkup"]);
    }

    #[test]
    fn test_inquiry_log_details_resolves_names() {
        let (mut registry, _) = registry_on(DateFixtures::inquiry_day());
        let missing = registry.adopt_person(PersonFixtures::jane_alex(&registry)).unwrap();
        let campus = registry.add_location(LocationFixtures::university_of_calgary());
        let inquiry = Inquiry::new(
            InquirerFixtures::john(),
            missing,
            "2025-02-10",
            "Looking for family member",
            campus,
        )
        .unwrap();

        let id = registry.add_inquiry(inquiry).unwrap();

        assert_eq!(
            registry.inquiry_log_details(id).unwrap(),
            "Inquirer: John, Missing Person: Jane Alex, Date of Inquiry: 2025-02-10, \
             Info Provided: Looking for family member, Last Known Location: University of Calgary"
        );
    }

    #[test]
    fn test_inquiries_from_generated_callers_are_kept_in_order() {
        let (mut registry, _) = registry_on(DateFixtures::inquiry_day());
        let missing = PersonBuilder::new("Jane").register(&mut registry).unwrap();
        let campus = registry.add_location(LocationFixtures::university_of_calgary());

        let first = InquiryBuilder::random().build(missing, campus).unwrap();
        let second = InquiryBuilder::new()
            .inquirer("Maria")
            .phone("403-555-0199")
            .info("Seen at the shelter entrance")
            .build(missing, campus)
            .unwrap();
        let first = registry.add_inquiry(first).unwrap();
        let second = registry.add_inquiry(second).unwrap();

        let ids: Vec<_> = registry.inquiries().iter().map(Inquiry::id).collect();
        assert_eq!(ids, vec![first, second]);
        assert_eq!(
            registry.inquiry(second).unwrap().date_of_inquiry(),
            DateFixtures::inquiry_day()
        );
    }

    #[test]
    fn test_inquiry_requires_registered_missing_person() {
        let (mut registry, _) = registry_on(DateFixtures::ymd(2025, 2, 10));
        let campus = registry.add_location(LocationFixtures::university_of_calgary());
        let stranger = IdentitySequence::new().next_id();
        let inquiry = InquiryBuilder::new().build(stranger, campus).unwrap();

        assert!(matches!(
            registry.add_inquiry(inquiry),
            Err(ReliefError::PersonNotFound(_))
        ));
        assert!(registry.inquiries().is_empty());
    }
}

mod serialization {
    use super::*;
    use domain_relief::Gender;
    use serde_json::json;

    #[test]
    fn test_holder_is_tagged() {
        assert_eq!(
            serde_json::to_value(Holder::Unowned).unwrap(),
            json!({ "holder": "unowned" })
        );
        let back: Holder = serde_json::from_value(json!({ "holder": "unowned" })).unwrap();
        assert_eq!(back, Holder::Unowned);
    }

    #[test]
    fn test_gender_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Gender::Female).unwrap(), json!("female"));
    }

    #[test]
    fn test_person_serializes_entry_date_as_iso() {
        let ids = IdentitySequence::new();
        let person = Person::new(&ids, "Freda", "2025-01-18").unwrap();
        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(value["entry_date"], json!("2025-01-18"));
        assert_eq!(value["first_name"], json!("Freda"));
    }
}

//! Custom Test Assertions
//!
//! Registry invariant checks that give more meaningful failure messages
//! than a bare `assert!`.

use chrono::NaiveDate;
use core_kernel::SupplyId;
use domain_relief::{Holder, ReliefRegistry};
use infra_db::MemoryFailureLog;

/// Asserts that a unit is held by exactly one holder, and that it is `expected`
pub fn assert_held_by(registry: &ReliefRegistry, supply: SupplyId, expected: Holder) {
    let mut holders = Vec::new();
    if registry.stock().iter().any(|s| s.id() == supply) {
        holders.push(Holder::Unowned);
    }
    holders.extend(
        registry
            .locations()
            .filter(|l| l.holds(supply))
            .map(|l| Holder::Location(l.id())),
    );
    holders.extend(
        registry
            .persons()
            .filter(|p| p.holds(supply))
            .map(|p| Holder::Person(p.id())),
    );

    assert_eq!(
        holders,
        vec![expected],
        "Supply {} should be held only by {}, found {:?}",
        supply,
        expected,
        holders
    );
}

/// Asserts that family groups and person back-references agree
pub fn assert_family_groups_consistent(registry: &ReliefRegistry) {
    for group in registry.family_groups() {
        for member in group.members() {
            let person = registry
                .person(*member)
                .unwrap_or_else(|| panic!("Group {} lists unknown person {}", group.id(), member));
            assert_eq!(
                person.family_group(),
                Some(group.id()),
                "Member {} of group {} points at {:?}",
                member,
                group.id(),
                person.family_group()
            );
        }
    }

    for person in registry.persons() {
        if let Some(group) = person.family_group() {
            let listed = registry
                .family_group(group)
                .map(|g| g.contains(person.id()))
                .unwrap_or(false);
            assert!(
                listed,
                "Person {} names group {} but is not one of its members",
                person.id(),
                group
            );
        }
    }
}

/// Asserts that nobody holds water expired as of `today`
pub fn assert_no_expired_water(registry: &ReliefRegistry, today: NaiveDate) {
    for person in registry.persons() {
        let expired: Vec<SupplyId> = person
            .supplies()
            .iter()
            .filter(|s| s.is_expired(today))
            .map(|s| s.id())
            .collect();
        assert!(
            expired.is_empty(),
            "{} still holds expired water {:?} on {}",
            person.full_name(),
            expired,
            today
        );
    }
}

/// Asserts that exactly one failure naming `operation` was logged
pub fn assert_failure_logged(log: &MemoryFailureLog, operation: &str) {
    let matching = log
        .entries()
        .into_iter()
        .filter(|e| e.operation == operation)
        .count();
    assert_eq!(
        matching,
        1,
        "Expected one failure for '{}', log holds {:?}",
        operation,
        log.entries()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{registry_on, DateFixtures, LocationFixtures};
    use domain_relief::Supply;

    #[test]
    fn test_stock_unit_held_by_unowned() {
        let (mut registry, _) = registry_on(DateFixtures::intake_start());
        let water = registry.add_stock(Supply::water(1));
        assert_held_by(&registry, water, Holder::Unowned);
    }

    #[test]
    fn test_allocated_unit_moves_holder() {
        let (mut registry, _) = registry_on(DateFixtures::intake_start());
        let location = registry.add_location(LocationFixtures::community_centre());
        let cot = registry.add_stock(Supply::cot("12", "A1", 1).unwrap());
        registry
            .allocate(cot, Holder::Unowned, Holder::Location(location))
            .unwrap();
        assert_held_by(&registry, cot, Holder::Location(location));
    }

    #[test]
    #[should_panic(expected = "should be held only by")]
    fn test_wrong_holder_panics() {
        let (mut registry, _) = registry_on(DateFixtures::intake_start());
        let water = registry.add_stock(Supply::water(1));
        let location = registry.add_location(LocationFixtures::community_centre());
        assert_held_by(&registry, water, Holder::Location(location));
    }
}

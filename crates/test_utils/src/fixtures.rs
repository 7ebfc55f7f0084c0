//! Pre-built Test Fixtures
//!
//! Ready-to-use dates, people and places drawn from intake scenarios. The
//! values are fixed so tests stay predictable.

use chrono::NaiveDate;
use core_kernel::FixedClock;
use domain_relief::{Inquirer, Location, Person, ReliefRegistry};
use std::sync::Arc;

/// Fixture dates
pub struct DateFixtures;

impl DateFixtures {
    /// Builds a date, panicking on an impossible one
    pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap_or_else(|| panic!("invalid fixture date {}-{}-{}", year, month, day))
    }

    /// First day of the simulated intake calendar
    pub fn intake_start() -> NaiveDate {
        Self::ymd(2025, 1, 18)
    }

    /// Day the missing-person inquiry is taken
    pub fn inquiry_day() -> NaiveDate {
        Self::ymd(2025, 2, 10)
    }
}

/// Registry pinned to a simulated calendar
pub fn registry_on(today: NaiveDate) -> (ReliefRegistry, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(today));
    (ReliefRegistry::new(clock.clone()), clock)
}

/// Fixture people
pub struct PersonFixtures;

impl PersonFixtures {
    /// First name and entry date only
    pub fn freda(registry: &ReliefRegistry) -> Person {
        Person::new(registry.ids(), "Freda", "2025-01-18")
            .unwrap_or_else(|e| panic!("fixture person rejected: {}", e))
    }

    /// A fully described adult
    pub fn jane_alex(registry: &ReliefRegistry) -> Person {
        let mut person =
            Person::with_date_of_birth(registry.ids(), "Jane", "2025-02-09", "1990-06-01")
                .unwrap_or_else(|e| panic!("fixture person rejected: {}", e));
        person.set_last_name(Some("Alex".to_string()));
        person
            .set_gender("female")
            .unwrap_or_else(|e| panic!("fixture gender rejected: {}", e));
        person
    }
}

/// Fixture locations
pub struct LocationFixtures;

impl LocationFixtures {
    pub fn university_of_calgary() -> Location {
        Location::new("University of Calgary", "2500 University Dr NW")
    }

    pub fn community_centre() -> Location {
        Location::new("Kensington Community Centre", "1112 Kensington Rd NW")
    }
}

/// Fixture inquirers
pub struct InquirerFixtures;

impl InquirerFixtures {
    /// An external caller looking for a relative
    pub fn john() -> Inquirer {
        Inquirer::new("John", None, "403-555-0100", "Brother of the missing person")
            .unwrap_or_else(|e| panic!("fixture inquirer rejected: {}", e))
    }
}

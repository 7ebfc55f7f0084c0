//! Property-Based Test Generators
//!
//! Proptest strategies for intake data that keep domain invariants:
//! birth dates never follow entry dates, names are non-blank and generated
//! supplies are always constructible.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use domain_relief::Supply;

use crate::fixtures::DateFixtures;

/// Strategy for dates between 1920-01-01 and roughly 2030
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..40_000).prop_map(|offset| {
        let base = DateFixtures::ymd(1920, 1, 1);
        base.checked_add_days(Days::new(offset)).unwrap_or(base)
    })
}

/// Strategy for an (entry date, date of birth) pair with birth on or before entry
pub fn entry_and_birth_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (date_strategy(), 0u64..36_500).prop_map(|(entry, age_days)| {
        let birth = entry.checked_sub_days(Days::new(age_days)).unwrap_or(entry);
        (entry, birth)
    })
}

/// Strategy for strings that are not valid `YYYY-MM-DD` dates
pub fn malformed_date_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[0-9]{8}",
        "[0-9]{4}/[0-9]{2}/[0-9]{2}",
        "[a-z]{3,10}",
        Just("2025-02-30".to_string()),
        Just("2025-13-01".to_string()),
    ]
}

/// Strategy for capitalized first names
pub fn first_name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,11}"
}

/// Strategy for an optional last name
pub fn last_name_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Z][a-z]{1,14}")
}

/// Strategy for accepted gender tokens in any letter case
pub fn gender_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("male"), Just("female"), Just("other")].prop_flat_map(|token| {
        proptest::collection::vec(any::<bool>(), token.len()).prop_map(move |upper| {
            token
                .chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect::<String>()
        })
    })
}

/// Strategy for cot positions; rooms may be a plain number or a spaced name
pub fn cot_position_strategy() -> impl Strategy<Value = (String, String)> {
    (
        prop_oneof!["[0-9]{2,3}", "(Room|Gym|Hall) [0-9]{1,2}"],
        "[A-H][0-9]{1,2}",
    )
}

/// Strategy for supplies that may be stored at a location
pub fn locatable_supply_strategy() -> impl Strategy<Value = Supply> {
    prop_oneof![
        (1u32..100).prop_map(Supply::water),
        (cot_position_strategy(), 1u32..4).prop_filter_map(
            "cot grid must be one token",
            |((room, grid), quantity)| Supply::cot(room, grid, quantity).ok()
        ),
        ("[A-Z][a-z]{2,12}", 1u32..500)
            .prop_map(|(type_name, quantity)| Supply::general(type_name, quantity)),
    ]
}

/// Strategy for any supply, personal belongings included
pub fn supply_strategy() -> impl Strategy<Value = Supply> {
    prop_oneof![
        3 => locatable_supply_strategy(),
        1 => "[A-Za-z ]{1,30}".prop_map(Supply::personal_belonging),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_relief::Gender;

    proptest! {
        #[test]
        fn prop_birth_never_after_entry((entry, birth) in entry_and_birth_strategy()) {
            prop_assert!(birth <= entry);
        }

        #[test]
        fn prop_gender_tokens_parse(token in gender_strategy()) {
            prop_assert!(token.parse::<Gender>().is_ok());
        }

        #[test]
        fn prop_locatable_supplies_are_locatable(supply in locatable_supply_strategy()) {
            prop_assert!(supply.is_locatable());
        }
    }
}

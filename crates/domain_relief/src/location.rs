//! Shelters and storage sites

use serde::Serialize;

use core_kernel::{LocationId, PersonId, SupplyId};

use crate::error::ReliefError;
use crate::supply::{self, Holder, Supply};

/// A physical site holding occupants and non-personal supplies.
///
/// Occupants are referenced by identifier; the location does not own them.
/// Stored supplies are owned by the location until they are allocated away.
#[derive(Debug, Serialize)]
pub struct Location {
    id: LocationId,
    name: String,
    address: String,
    occupants: Vec<PersonId>,
    supplies: Vec<Supply>,
}

impl Location {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            name: name.into(),
            address: address.into(),
            occupants: Vec::new(),
            supplies: Vec::new(),
        }
    }

    pub fn id(&self) -> LocationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn occupants(&self) -> &[PersonId] {
        &self.occupants
    }

    /// Adds an occupant; adding the same person twice has no effect
    pub fn add_occupant(&mut self, person: PersonId) {
        if !self.occupants.contains(&person) {
            self.occupants.push(person);
        }
    }

    pub fn remove_occupant(&mut self, person: PersonId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|p| *p != person);
        before != self.occupants.len()
    }

    pub fn supplies(&self) -> &[Supply] {
        &self.supplies
    }

    pub fn holds(&self, supply: SupplyId) -> bool {
        self.supplies.iter().any(|s| s.id() == supply)
    }

    /// Stores an unplaced supply here.
    ///
    /// Personal belongings are rejected and the store is left unchanged.
    pub fn add_supply(&mut self, supply: Supply) -> Result<(), ReliefError> {
        ensure_locatable(&supply)?;
        self.store(supply);
        Ok(())
    }

    /// Takes a supply out of this location
    pub fn remove_supply(&mut self, supply: SupplyId) -> Option<Supply> {
        supply::take_from(&mut self.supplies, supply)
    }

    pub(crate) fn store(&mut self, mut supply: Supply) {
        supply.enter(Holder::Location(self.id), None);
        self.supplies.push(supply);
    }
}

pub(crate) fn ensure_locatable(supply: &Supply) -> Result<(), ReliefError> {
    if supply.is_locatable() {
        Ok(())
    } else {
        Err(ReliefError::PlacementRejected {
            supply: supply.id(),
            type_name: supply.type_name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::IdentitySequence;

    #[test]
    fn test_personal_belonging_rejected() {
        let mut location = Location::new("Shelter A", "123 Main St");
        let result = location.add_supply(Supply::personal_belonging("Red backpack"));
        assert!(matches!(result, Err(ReliefError::PlacementRejected { .. })));
        assert!(location.supplies().is_empty());
    }

    #[test]
    fn test_cot_stored_with_location_holder() {
        let mut location = Location::new("Shelter A", "123 Main St");
        let cot = Supply::cot("115", "B6", 1).unwrap();
        let cot_id = cot.id();
        location.add_supply(cot).unwrap();

        assert!(location.holds(cot_id));
        assert_eq!(location.supplies()[0].holder(), Holder::Location(location.id()));
    }

    #[test]
    fn test_stored_water_has_no_allocation_date() {
        let ids = IdentitySequence::new();
        let mut water = Supply::water(2);
        water.enter(Holder::Person(ids.next_id()), NaiveDate::from_ymd_opt(2025, 1, 1));

        let mut location = Location::new("Shelter A", "123 Main St");
        location.add_supply(water).unwrap();
        assert_eq!(location.supplies()[0].allocation_date(), None);
    }

    #[test]
    fn test_occupants_are_unique() {
        let ids = IdentitySequence::new();
        let person = ids.next_id();
        let mut location = Location::new("Shelter A", "123 Main St");
        location.add_occupant(person);
        location.add_occupant(person);
        assert_eq!(location.occupants(), &[person]);
        assert!(location.remove_occupant(person));
        assert!(!location.remove_occupant(person));
    }
}

//! The relief registry
//!
//! [`ReliefRegistry`] owns every entity of an intake session together with
//! the identity sequence and the clock. Entities refer to each other by
//! identifier; all cross-entity mutation goes through the registry so that
//! family membership, occupancy and supply ownership stay consistent.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use core_kernel::{Clock, IdentitySequence, InquiryId, LocationId, PersonId, SystemClock};

use crate::error::ReliefError;
use crate::family::FamilyGroup;
use crate::inquiry::Inquiry;
use crate::location::Location;
use crate::medical::MedicalRecord;
use crate::person::Person;
use crate::supply::Supply;

/// In-memory context for one intake session
#[derive(Debug)]
pub struct ReliefRegistry {
    ids: IdentitySequence,
    clock: Arc<dyn Clock>,
    pub(crate) persons: BTreeMap<PersonId, Person>,
    pub(crate) locations: BTreeMap<LocationId, Location>,
    family_groups: BTreeMap<String, FamilyGroup>,
    pub(crate) stock: Vec<Supply>,
    inquiries: Vec<Inquiry>,
}

impl Default for ReliefRegistry {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl ReliefRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            ids: IdentitySequence::new(),
            clock,
            persons: BTreeMap::new(),
            locations: BTreeMap::new(),
            family_groups: BTreeMap::new(),
            stock: Vec::new(),
            inquiries: Vec::new(),
        }
    }

    /// Identity sequence used for every person built for this registry
    pub fn ids(&self) -> &IdentitySequence {
        &self.ids
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ------------------------------------------------------------------
    // Persons
    // ------------------------------------------------------------------

    /// Creates and registers a person from a first name and entry date
    pub fn register_person(
        &mut self,
        first_name: impl Into<String>,
        entry_date: &str,
    ) -> Result<PersonId, ReliefError> {
        let person = Person::new(&self.ids, first_name, entry_date)?;
        self.adopt_person(person)
    }

    /// Takes ownership of a person built with [`Self::ids`].
    ///
    /// Detached persons never carry a family group; join one afterwards
    /// with [`Self::add_family_member`].
    pub fn adopt_person(&mut self, person: Person) -> Result<PersonId, ReliefError> {
        let id = person.id();
        if self.persons.contains_key(&id) {
            return Err(ReliefError::DuplicatePerson(id));
        }
        self.persons.insert(id, person);

        debug!(person = %id, "Person registered");
        Ok(id)
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    pub fn person_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.persons.get_mut(&id)
    }

    /// Registered persons in identifier order
    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    /// First person whose first and last name match exactly
    pub fn find_person_by_name(&self, first_name: &str, last_name: Option<&str>) -> Option<&Person> {
        self.persons
            .values()
            .find(|p| p.first_name() == first_name && p.last_name() == last_name)
    }

    /// Removes a person, clearing their family membership and occupancy.
    ///
    /// The person is returned with whatever supplies they still hold.
    pub fn remove_person(&mut self, id: PersonId) -> Result<Person, ReliefError> {
        let mut person = self
            .persons
            .remove(&id)
            .ok_or(ReliefError::PersonNotFound(id))?;

        if let Some(group) = person.family_group().map(str::to_string) {
            if let Some(group) = self.family_groups.get_mut(&group) {
                group.remove(id);
            }
            person.set_family_group(None);
        }
        for location in self.locations.values_mut() {
            location.remove_occupant(id);
        }

        debug!(person = %id, "Person removed");
        Ok(person)
    }

    pub(crate) fn require_person(&self, id: PersonId) -> Result<&Person, ReliefError> {
        self.persons.get(&id).ok_or(ReliefError::PersonNotFound(id))
    }

    pub(crate) fn require_person_mut(&mut self, id: PersonId) -> Result<&mut Person, ReliefError> {
        self.persons
            .get_mut(&id)
            .ok_or(ReliefError::PersonNotFound(id))
    }

    /// Adds a medical record to a person; the treating location must exist
    pub fn add_medical_record(
        &mut self,
        person: PersonId,
        record: MedicalRecord,
    ) -> Result<(), ReliefError> {
        self.require_location(record.location())?;
        self.require_person_mut(person)?.add_medical_record(record);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------

    pub fn add_location(&mut self, location: Location) -> LocationId {
        let id = location.id();
        debug!(location = %id, name = location.name(), "Location added");
        self.locations.insert(id, location);
        id
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn location_mut(&mut self, id: LocationId) -> Option<&mut Location> {
        self.locations.get_mut(&id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn find_location_by_name(&self, name: &str) -> Option<&Location> {
        self.locations.values().find(|l| l.name() == name)
    }

    pub(crate) fn require_location(&self, id: LocationId) -> Result<&Location, ReliefError> {
        self.locations
            .get(&id)
            .ok_or(ReliefError::LocationNotFound(id))
    }

    pub(crate) fn require_location_mut(
        &mut self,
        id: LocationId,
    ) -> Result<&mut Location, ReliefError> {
        self.locations
            .get_mut(&id)
            .ok_or(ReliefError::LocationNotFound(id))
    }

    /// Records a person as an occupant of a location
    pub fn assign_occupant(
        &mut self,
        location: LocationId,
        person: PersonId,
    ) -> Result<(), ReliefError> {
        self.require_person(person)?;
        self.require_location_mut(location)?.add_occupant(person);
        Ok(())
    }

    pub fn remove_occupant(
        &mut self,
        location: LocationId,
        person: PersonId,
    ) -> Result<bool, ReliefError> {
        Ok(self.require_location_mut(location)?.remove_occupant(person))
    }

    // ------------------------------------------------------------------
    // Family groups
    // ------------------------------------------------------------------

    pub fn create_family_group(&mut self, id: impl Into<String>) -> Result<(), ReliefError> {
        let id = id.into();
        if self.family_groups.contains_key(&id) {
            return Err(ReliefError::DuplicateFamilyGroup(id));
        }
        self.family_groups.insert(id.clone(), FamilyGroup::new(id));
        Ok(())
    }

    pub fn family_group(&self, id: &str) -> Option<&FamilyGroup> {
        self.family_groups.get(id)
    }

    pub fn family_groups(&self) -> impl Iterator<Item = &FamilyGroup> {
        self.family_groups.values()
    }

    /// Group the person currently belongs to
    pub fn family_of(&self, person: PersonId) -> Option<&FamilyGroup> {
        let group = self.persons.get(&person)?.family_group()?;
        self.family_groups.get(group)
    }

    /// Adds a person to a group.
    ///
    /// A person already in another group is moved out of it first, so they
    /// end up in this group only.
    pub fn add_family_member(&mut self, group: &str, person: PersonId) -> Result<(), ReliefError> {
        if !self.family_groups.contains_key(group) {
            return Err(ReliefError::FamilyGroupNotFound(group.to_string()));
        }
        let previous = self
            .require_person(person)?
            .family_group()
            .map(str::to_string);

        if let Some(previous) = previous.filter(|g| g != group) {
            if let Some(old) = self.family_groups.get_mut(&previous) {
                old.remove(person);
                debug!(person = %person, from = %previous, to = group, "Family member transferred");
            }
        }

        if let Some(target) = self.family_groups.get_mut(group) {
            target.insert(person);
        }
        self.require_person_mut(person)?
            .set_family_group(Some(group.to_string()));
        Ok(())
    }

    /// Removes a person from a group; returns false if they were not in it
    pub fn remove_family_member(&mut self, group: &str, person: PersonId) -> Result<bool, ReliefError> {
        let target = self
            .family_groups
            .get_mut(group)
            .ok_or_else(|| ReliefError::FamilyGroupNotFound(group.to_string()))?;
        if !target.remove(person) {
            return Ok(false);
        }
        if let Some(p) = self.persons.get_mut(&person) {
            p.set_family_group(None);
        }
        Ok(true)
    }

    /// Deletes a group and clears the back-reference of every member
    pub fn remove_family_group(&mut self, id: &str) -> Result<FamilyGroup, ReliefError> {
        let group = self
            .family_groups
            .remove(id)
            .ok_or_else(|| ReliefError::FamilyGroupNotFound(id.to_string()))?;
        for member in group.members() {
            if let Some(p) = self.persons.get_mut(member) {
                p.set_family_group(None);
            }
        }
        Ok(group)
    }

    /// Changes a group's identifier, updating every member
    pub fn rename_family_group(&mut self, id: &str, new_id: impl Into<String>) -> Result<(), ReliefError> {
        let new_id = new_id.into();
        if new_id == id {
            return Ok(());
        }
        if self.family_groups.contains_key(&new_id) {
            return Err(ReliefError::DuplicateFamilyGroup(new_id));
        }
        let mut group = self
            .family_groups
            .remove(id)
            .ok_or_else(|| ReliefError::FamilyGroupNotFound(id.to_string()))?;

        group.set_id(new_id.clone());
        for member in group.members() {
            if let Some(p) = self.persons.get_mut(member) {
                p.set_family_group(Some(new_id.clone()));
            }
        }
        self.family_groups.insert(new_id, group);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inquiries
    // ------------------------------------------------------------------

    /// Files an inquiry; the missing person and last known location must be
    /// registered
    pub fn add_inquiry(&mut self, inquiry: Inquiry) -> Result<InquiryId, ReliefError> {
        self.require_person(inquiry.missing_person())?;
        self.require_location(inquiry.last_known_location())?;
        if let Some(inquirer) = inquiry.inquirer().person() {
            self.require_person(inquirer)?;
        }
        let id = inquiry.id();
        self.inquiries.push(inquiry);
        Ok(id)
    }

    /// Inquiries in filing order
    pub fn inquiries(&self) -> &[Inquiry] {
        &self.inquiries
    }

    pub fn inquiry(&self, id: InquiryId) -> Option<&Inquiry> {
        self.inquiries.iter().find(|i| i.id() == id)
    }

    pub fn inquiry_mut(&mut self, id: InquiryId) -> Option<&mut Inquiry> {
        self.inquiries.iter_mut().find(|i| i.id() == id)
    }

    /// Log summary of an inquiry with names resolved from the registry
    pub fn inquiry_log_details(&self, id: InquiryId) -> Result<String, ReliefError> {
        let inquiry = self.inquiry(id).ok_or(ReliefError::InquiryNotFound(id))?;
        let missing = self.require_person(inquiry.missing_person())?;
        let location = self.require_location(inquiry.last_known_location())?;
        Ok(inquiry.log_details(missing, location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::FixedClock;

    fn registry() -> ReliefRegistry {
        let today = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        ReliefRegistry::new(Arc::new(FixedClock::new(today)))
    }

    #[test]
    fn test_register_assigns_increasing_ids() {
        let mut registry = registry();
        let a = registry.register_person("Freda", "2025-01-18").unwrap();
        let b = registry.register_person("Jane", "2025-01-19").unwrap();
        assert!(a < b);
        assert_eq!(registry.person_count(), 2);
    }

    #[test]
    fn test_adopted_person_joins_no_group() {
        let mut registry = registry();
        let person = Person::new(registry.ids(), "Freda", "2025-01-18").unwrap();
        let id = registry.adopt_person(person).unwrap();

        assert_eq!(registry.person(id).unwrap().family_group(), None);
        assert_eq!(registry.family_groups().count(), 0);

        registry.create_family_group("A").unwrap();
        registry.add_family_member("A", id).unwrap();
        assert_eq!(registry.person(id).unwrap().family_group(), Some("A"));
    }

    #[test]
    fn test_family_transfer() {
        let mut registry = registry();
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        registry.create_family_group("A").unwrap();
        registry.create_family_group("B").unwrap();

        registry.add_family_member("A", person).unwrap();
        registry.add_family_member("B", person).unwrap();

        assert!(!registry.family_group("A").unwrap().contains(person));
        assert!(registry.family_group("B").unwrap().contains(person));
        assert_eq!(registry.person(person).unwrap().family_group(), Some("B"));
    }

    #[test]
    fn test_remove_person_clears_references() {
        let mut registry = registry();
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        let shelter = registry.add_location(Location::new("Shelter A", "123 Main St"));
        registry.create_family_group("A").unwrap();
        registry.add_family_member("A", person).unwrap();
        registry.assign_occupant(shelter, person).unwrap();

        let removed = registry.remove_person(person).unwrap();

        assert_eq!(removed.family_group(), None);
        assert!(registry.family_group("A").unwrap().is_empty());
        assert!(registry.location(shelter).unwrap().occupants().is_empty());
        assert!(registry.remove_person(person).unwrap_err().is_not_found());
    }

    #[test]
    fn test_rename_family_group_updates_members() {
        let mut registry = registry();
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        registry.create_family_group("A").unwrap();
        registry.add_family_member("A", person).unwrap();

        registry.rename_family_group("A", "Smith").unwrap();

        assert!(registry.family_group("A").is_none());
        assert_eq!(registry.family_of(person).unwrap().id(), "Smith");
    }

    #[test]
    fn test_medical_record_requires_known_location() {
        let mut registry = registry();
        let person = registry.register_person("Freda", "2025-01-18").unwrap();
        let record = MedicalRecord::new(LocationId::new(), "2025-01-19", "Stitches").unwrap();
        assert!(matches!(
            registry.add_medical_record(person, record),
            Err(ReliefError::LocationNotFound(_))
        ));
    }
}

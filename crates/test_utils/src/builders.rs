//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use chrono::NaiveDate;
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;

use core_kernel::{LocationId, PersonId};
use domain_relief::{Inquirer, Inquiry, Person, ReliefError, ReliefRegistry};
use infra_db::repositories::NewPerson;

use crate::fixtures::DateFixtures;

/// Builder for registry persons
#[derive(Debug, Clone)]
pub struct PersonBuilder {
    first_name: String,
    last_name: Option<String>,
    entry_date: String,
    date_of_birth: Option<String>,
    gender: Option<String>,
    family_group: Option<String>,
}

impl Default for PersonBuilder {
    fn default() -> Self {
        Self::new("Freda")
    }
}

impl PersonBuilder {
    /// Creates a builder entering on the intake start date
    pub fn new(first_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: None,
            entry_date: DateFixtures::intake_start().to_string(),
            date_of_birth: None,
            gender: None,
            family_group: None,
        }
    }

    /// A builder with generated first and last names
    pub fn random() -> Self {
        let first: String = FirstName().fake();
        let last: String = LastName().fake();
        Self::new(first).last_name(last)
    }

    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Sets the raw entry date text, which may be malformed
    pub fn entry_date(mut self, entry_date: impl Into<String>) -> Self {
        self.entry_date = entry_date.into();
        self
    }

    pub fn date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = Some(date_of_birth.into());
        self
    }

    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Group to join when registered
    pub fn family_group(mut self, group: impl Into<String>) -> Self {
        self.family_group = Some(group.into());
        self
    }

    /// Builds a detached person drawing its id from the registry
    pub fn build(&self, registry: &ReliefRegistry) -> Result<Person, ReliefError> {
        let mut person = match &self.date_of_birth {
            Some(dob) => Person::with_date_of_birth(
                registry.ids(),
                self.first_name.clone(),
                &self.entry_date,
                dob,
            )?,
            None => Person::new(registry.ids(), self.first_name.clone(), &self.entry_date)?,
        };
        person.set_last_name(self.last_name.clone());
        if let Some(gender) = &self.gender {
            person.set_gender(gender)?;
        }
        Ok(person)
    }

    /// Builds the person and registers it, joining the family group if set
    pub fn register(&self, registry: &mut ReliefRegistry) -> Result<PersonId, ReliefError> {
        let person = self.build(registry)?;
        let id = registry.adopt_person(person)?;
        if let Some(group) = &self.family_group {
            if registry.family_group(group).is_none() {
                registry.create_family_group(group.clone())?;
            }
            registry.add_family_member(group, id)?;
        }
        Ok(id)
    }

    /// Row form for seeding a store directly, bypassing validation
    pub fn row(&self) -> NewPerson {
        NewPerson {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self
                .date_of_birth
                .as_deref()
                .and_then(|d| d.parse::<NaiveDate>().ok()),
            gender: self.gender.clone(),
            entry_date: self
                .entry_date
                .parse()
                .unwrap_or_else(|_| DateFixtures::intake_start()),
            comments: None,
            family_group: self.family_group.clone(),
        }
    }
}

/// Builder for inquiries taken from an external caller
#[derive(Debug, Clone)]
pub struct InquiryBuilder {
    first_name: String,
    phone: String,
    about_inquirer: String,
    date_of_inquiry: String,
    info_provided: String,
}

impl Default for InquiryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InquiryBuilder {
    pub fn new() -> Self {
        Self {
            first_name: "John".to_string(),
            phone: "403-555-0100".to_string(),
            about_inquirer: String::new(),
            date_of_inquiry: DateFixtures::inquiry_day().to_string(),
            info_provided: "Last seen near the library".to_string(),
        }
    }

    /// An inquirer with generated name and phone number
    pub fn random() -> Self {
        let first: String = FirstName().fake();
        let phone: String = PhoneNumber().fake();
        Self::new().inquirer(first).phone(phone)
    }

    pub fn inquirer(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn info(mut self, info: impl Into<String>) -> Self {
        self.info_provided = info.into();
        self
    }

    pub fn build(&self, missing: PersonId, location: LocationId) -> Result<Inquiry, ReliefError> {
        let inquirer = Inquirer::new(
            self.first_name.clone(),
            None,
            self.phone.clone(),
            self.about_inquirer.clone(),
        )?;
        Inquiry::new(
            inquirer,
            missing,
            &self.date_of_inquiry,
            self.info_provided.clone(),
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::registry_on;

    #[test]
    fn test_person_builder_defaults() {
        let (registry, _) = registry_on(DateFixtures::intake_start());
        let person = PersonBuilder::default().build(&registry).unwrap();

        assert_eq!(person.first_name(), "Freda");
        assert_eq!(person.entry_date(), DateFixtures::intake_start());
        assert!(person.last_name().is_none());
    }

    #[test]
    fn test_register_joins_group() {
        let (mut registry, _) = registry_on(DateFixtures::intake_start());
        let id = PersonBuilder::new("Ana")
            .family_group("F7")
            .register(&mut registry)
            .unwrap();

        assert!(registry.family_group("F7").unwrap().contains(id));
    }

    #[test]
    fn test_random_person_is_valid() {
        let (registry, _) = registry_on(DateFixtures::intake_start());
        let person = PersonBuilder::random().build(&registry).unwrap();
        assert!(!person.first_name().is_empty());
    }

    #[test]
    fn test_row_keeps_invalid_birth_date() {
        let row = PersonBuilder::new("Jessica")
            .entry_date("2025-02-17")
            .date_of_birth("2025-02-18")
            .row();
        assert!(row.date_of_birth > Some(row.entry_date));
    }
}

//! Missing-person inquiries

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::temporal::parse_iso_date;
use core_kernel::{InquiryId, LocationId, PersonId};

use crate::error::ReliefError;
use crate::location::Location;
use crate::person::Person;

/// Whether the inquirer is a registered victim or an outside party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquirerKind {
    Victim,
    External,
}

impl InquirerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquirerKind::Victim => "victim",
            InquirerKind::External => "external",
        }
    }
}

impl fmt::Display for InquirerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Someone asking after a missing person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquirer {
    first_name: String,
    last_name: Option<String>,
    phone: String,
    info: String,
    person: Option<PersonId>,
}

impl Inquirer {
    /// An inquirer from outside the registry
    pub fn new(
        first_name: impl Into<String>,
        last_name: Option<String>,
        phone: impl Into<String>,
        info: impl Into<String>,
    ) -> Result<Self, ReliefError> {
        let first_name = first_name.into();
        if first_name.trim().is_empty() {
            return Err(ReliefError::MissingField("inquirer first name"));
        }
        Ok(Self {
            first_name,
            last_name: last_name.filter(|name| !name.trim().is_empty()),
            phone: phone.into(),
            info: info.into(),
            person: None,
        })
    }

    /// A registered person acting as inquirer; names are copied from them
    pub fn from_person(person: &Person, phone: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            first_name: person.first_name().to_string(),
            last_name: person.last_name().map(str::to_string),
            phone: phone.into(),
            info: info.into(),
            person: Some(person.id()),
        }
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Services phone number
    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    /// The registered person behind this inquirer, if any
    pub fn person(&self) -> Option<PersonId> {
        self.person
    }

    pub fn kind(&self) -> InquirerKind {
        match self.person {
            Some(_) => InquirerKind::Victim,
            None => InquirerKind::External,
        }
    }
}

/// An inquiry about a missing person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    id: InquiryId,
    inquirer: Inquirer,
    missing_person: PersonId,
    date_of_inquiry: NaiveDate,
    info_provided: String,
    last_known_location: LocationId,
}

impl Inquiry {
    pub fn new(
        inquirer: Inquirer,
        missing_person: PersonId,
        date_of_inquiry: &str,
        info_provided: impl Into<String>,
        last_known_location: LocationId,
    ) -> Result<Self, ReliefError> {
        let date = parse_iso_date(date_of_inquiry)
            .map_err(|e| ReliefError::invalid_date("date of inquiry", e))?;
        Ok(Self::from_date(
            inquirer,
            missing_person,
            date,
            info_provided,
            last_known_location,
        ))
    }

    pub fn from_date(
        inquirer: Inquirer,
        missing_person: PersonId,
        date_of_inquiry: NaiveDate,
        info_provided: impl Into<String>,
        last_known_location: LocationId,
    ) -> Self {
        Self {
            id: InquiryId::new(),
            inquirer,
            missing_person,
            date_of_inquiry,
            info_provided: info_provided.into(),
            last_known_location,
        }
    }

    pub fn id(&self) -> InquiryId {
        self.id
    }

    pub fn inquirer(&self) -> &Inquirer {
        &self.inquirer
    }

    pub fn inquirer_kind(&self) -> InquirerKind {
        self.inquirer.kind()
    }

    pub fn missing_person(&self) -> PersonId {
        self.missing_person
    }

    pub fn date_of_inquiry(&self) -> NaiveDate {
        self.date_of_inquiry
    }

    /// Replaces the inquiry date; the previous date is kept on failure
    pub fn set_date_of_inquiry(&mut self, date: &str) -> Result<(), ReliefError> {
        self.date_of_inquiry =
            parse_iso_date(date).map_err(|e| ReliefError::invalid_date("date of inquiry", e))?;
        Ok(())
    }

    pub fn info_provided(&self) -> &str {
        &self.info_provided
    }

    pub fn set_info_provided(&mut self, info: impl Into<String>) {
        self.info_provided = info.into();
    }

    pub fn last_known_location(&self) -> LocationId {
        self.last_known_location
    }

    /// One-line summary naming the resolved missing person and location
    pub fn log_details(&self, missing: &Person, location: &Location) -> String {
        format!(
            "Inquirer: {}, Missing Person: {}, Date of Inquiry: {}, Info Provided: {}, Last Known Location: {}",
            self.inquirer.first_name,
            missing.full_name(),
            self.date_of_inquiry,
            self.info_provided,
            location.name()
        )
    }
}

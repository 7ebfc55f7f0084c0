//! Registered disaster victims
//!
//! A [`Person`] is created with a first name and an entry date and receives
//! its identifier from the registry's [`IdentitySequence`]. The entry date
//! and identifier never change afterwards; every other field is validated on
//! each write.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::temporal::{ensure_not_after, parse_iso_date};
use core_kernel::{IdentitySequence, PersonId, SupplyId};

use crate::error::ReliefError;
use crate::medical::MedicalRecord;
use crate::supply::{self, Holder, Supply};

/// Accepted gender tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ReliefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(ReliefError::InvalidGender(s.to_string())),
        }
    }
}

/// A displaced individual registered at intake
#[derive(Debug, Serialize)]
pub struct Person {
    id: PersonId,
    first_name: String,
    last_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<Gender>,
    entry_date: NaiveDate,
    comments: Option<String>,
    family_group: Option<String>,
    medical_records: Vec<MedicalRecord>,
    supplies: Vec<Supply>,
}

impl Person {
    /// Registers a person with a first name and an entry date (`YYYY-MM-DD`)
    pub fn new(
        ids: &IdentitySequence,
        first_name: impl Into<String>,
        entry_date: &str,
    ) -> Result<Self, ReliefError> {
        let entry = parse_iso_date(entry_date)
            .map_err(|e| ReliefError::invalid_date("entry date", e))?;
        Self::from_dates(ids, first_name, entry, None)
    }

    /// Registers a person whose date of birth is known
    pub fn with_date_of_birth(
        ids: &IdentitySequence,
        first_name: impl Into<String>,
        entry_date: &str,
        date_of_birth: &str,
    ) -> Result<Self, ReliefError> {
        let entry = parse_iso_date(entry_date)
            .map_err(|e| ReliefError::invalid_date("entry date", e))?;
        let birth = parse_iso_date(date_of_birth)
            .map_err(|e| ReliefError::invalid_date("date of birth", e))?;
        Self::from_dates(ids, first_name, entry, Some(birth))
    }

    /// Registers a person from already-parsed dates.
    ///
    /// All checks run before an identifier is drawn, so a rejected person
    /// does not consume one.
    pub fn from_dates(
        ids: &IdentitySequence,
        first_name: impl Into<String>,
        entry_date: NaiveDate,
        date_of_birth: Option<NaiveDate>,
    ) -> Result<Self, ReliefError> {
        let first_name = first_name.into();
        if first_name.trim().is_empty() {
            return Err(ReliefError::MissingField("first name"));
        }
        if let Some(birth) = date_of_birth {
            check_birth(birth, entry_date)?;
        }

        Ok(Self {
            id: ids.next_id(),
            first_name,
            last_name: None,
            date_of_birth,
            gender: None,
            entry_date,
            comments: None,
            family_group: None,
            medical_records: Vec::new(),
            supplies: Vec::new(),
        })
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) -> Result<(), ReliefError> {
        let first_name = first_name.into();
        if first_name.trim().is_empty() {
            return Err(ReliefError::MissingField("first name"));
        }
        self.first_name = first_name;
        Ok(())
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// Blank last names are stored as absent
    pub fn set_last_name(&mut self, last_name: Option<String>) {
        self.last_name = last_name.filter(|name| !name.trim().is_empty());
    }

    /// First name followed by the last name when there is one
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    /// Sets the date of birth (`YYYY-MM-DD`), which may not fall after the
    /// entry date
    pub fn set_date_of_birth(&mut self, date_of_birth: &str) -> Result<(), ReliefError> {
        let birth = parse_iso_date(date_of_birth)
            .map_err(|e| ReliefError::invalid_date("date of birth", e))?;
        check_birth(birth, self.entry_date)?;
        self.date_of_birth = Some(birth);
        Ok(())
    }

    pub fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Sets the gender from a case-insensitive token
    pub fn set_gender(&mut self, gender: &str) -> Result<(), ReliefError> {
        self.gender = Some(gender.parse()?);
        Ok(())
    }

    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = Some(comments.into());
    }

    /// Identifier of the family group this person belongs to
    pub fn family_group(&self) -> Option<&str> {
        self.family_group.as_deref()
    }

    pub(crate) fn set_family_group(&mut self, group: Option<String>) {
        self.family_group = group;
    }

    /// Medical records in the order they were added
    pub fn medical_records(&self) -> &[MedicalRecord] {
        &self.medical_records
    }

    pub fn add_medical_record(&mut self, record: MedicalRecord) {
        self.medical_records.push(record);
    }

    /// Replaces every medical record
    pub fn set_medical_records(&mut self, records: Vec<MedicalRecord>) {
        self.medical_records = records;
    }

    /// Supplies currently held, in the order they were received
    pub fn supplies(&self) -> &[Supply] {
        &self.supplies
    }

    pub fn holds(&self, supply: SupplyId) -> bool {
        self.supplies.iter().any(|s| s.id() == supply)
    }

    /// Hands an unplaced supply to this person, stamping water with `today`
    pub fn add_supply(&mut self, supply: Supply, today: NaiveDate) {
        self.hold(supply, today);
    }

    /// Takes a supply back from this person
    pub fn remove_supply(&mut self, supply: SupplyId) -> Option<Supply> {
        supply::take_from(&mut self.supplies, supply)
    }

    pub(crate) fn hold(&mut self, mut supply: Supply, stamp: NaiveDate) {
        supply.enter(Holder::Person(self.id), Some(stamp));
        self.supplies.push(supply);
    }

    /// Drops every expired water unit, keeping the order of what remains,
    /// and returns the dropped units
    pub fn remove_expired_water(&mut self, today: NaiveDate) -> Vec<Supply> {
        let (expired, kept): (Vec<Supply>, Vec<Supply>) = std::mem::take(&mut self.supplies)
            .into_iter()
            .partition(|s| s.is_expired(today));
        self.supplies = kept;
        expired
            .into_iter()
            .map(|mut s| {
                s.leave();
                s
            })
            .collect()
    }
}

fn check_birth(birth: NaiveDate, entry: NaiveDate) -> Result<(), ReliefError> {
    ensure_not_after(birth, entry).map_err(|_| ReliefError::BirthAfterEntry {
        date_of_birth: birth,
        entry_date: entry,
    })
}

//! Relief domain errors
//!
//! Every failure raised by the domain model is either a validation error
//! (the caller can retry with corrected input) or a not-found error (the
//! referenced entity or supply unit is not where the caller said it was).

use chrono::NaiveDate;
use thiserror::Error;

use core_kernel::{InquiryId, LocationId, PersonId, SupplyId, TemporalError};

use crate::supply::Holder;

/// Errors that can occur in the relief domain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReliefError {
    /// A required text field was empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A date did not follow the `YYYY-MM-DD` layout
    #[error("Invalid date format for {field}: {source}")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: TemporalError,
    },

    /// A person cannot be born after entering a centre
    #[error("Birthdate {date_of_birth} must be the same as or before entry date {entry_date}")]
    BirthAfterEntry {
        date_of_birth: NaiveDate,
        entry_date: NaiveDate,
    },

    /// Gender outside the accepted tokens
    #[error("Invalid gender '{0}'. Acceptable values are male, female, or other.")]
    InvalidGender(String),

    /// Personal belongings cannot be stored at a location
    #[error("Supply {supply} ({type_name}) cannot be placed at a location")]
    PlacementRejected { supply: SupplyId, type_name: String },

    /// A supply unit may only move between a location and a person
    #[error("Supply {supply} cannot move from {from} to {to}")]
    IllegalTransfer {
        supply: SupplyId,
        from: Holder,
        to: Holder,
    },

    /// A variant-specific field was set on the wrong kind of supply
    #[error("Supply {supply} is not a {expected}")]
    WrongSupplyKind {
        supply: SupplyId,
        expected: &'static str,
    },

    /// Cot grid cells are a single token
    #[error("Invalid cot grid '{0}': grid cells cannot contain whitespace")]
    InvalidCotGrid(String),

    /// The supply unit is not held where the caller said it was
    #[error("Supply {supply} not found at {holder}")]
    SupplyNotFound { supply: SupplyId, holder: Holder },

    #[error("Person not found: {0}")]
    PersonNotFound(PersonId),

    #[error("Person already registered: {0}")]
    DuplicatePerson(PersonId),

    #[error("Location not found: {0}")]
    LocationNotFound(LocationId),

    #[error("Family group not found: {0}")]
    FamilyGroupNotFound(String),

    #[error("Family group already exists: {0}")]
    DuplicateFamilyGroup(String),

    #[error("Inquiry not found: {0}")]
    InquiryNotFound(InquiryId),
}

impl ReliefError {
    pub(crate) fn invalid_date(field: &'static str, source: TemporalError) -> Self {
        ReliefError::InvalidDate { field, source }
    }

    /// True for errors the caller can fix by supplying corrected input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ReliefError::MissingField(_)
                | ReliefError::InvalidDate { .. }
                | ReliefError::BirthAfterEntry { .. }
                | ReliefError::InvalidGender(_)
                | ReliefError::PlacementRejected { .. }
                | ReliefError::IllegalTransfer { .. }
                | ReliefError::WrongSupplyKind { .. }
                | ReliefError::InvalidCotGrid(_)
                | ReliefError::DuplicatePerson(_)
                | ReliefError::DuplicateFamilyGroup(_)
        )
    }

    /// True when the referenced entity or supply unit does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ReliefError::SupplyNotFound { .. }
                | ReliefError::PersonNotFound(_)
                | ReliefError::LocationNotFound(_)
                | ReliefError::FamilyGroupNotFound(_)
                | ReliefError::InquiryNotFound(_)
        )
    }
}

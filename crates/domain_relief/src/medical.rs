//! Medical treatment records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::temporal::parse_iso_date;
use core_kernel::LocationId;

use crate::error::ReliefError;

/// A treatment given to a person at a location. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    location: LocationId,
    date_of_treatment: NaiveDate,
    treatment_details: String,
}

impl MedicalRecord {
    /// Creates a record from a `YYYY-MM-DD` treatment date
    pub fn new(
        location: LocationId,
        date_of_treatment: &str,
        treatment_details: impl Into<String>,
    ) -> Result<Self, ReliefError> {
        let date = parse_iso_date(date_of_treatment)
            .map_err(|e| ReliefError::invalid_date("date of treatment", e))?;
        Ok(Self::from_date(location, date, treatment_details))
    }

    pub fn from_date(
        location: LocationId,
        date_of_treatment: NaiveDate,
        treatment_details: impl Into<String>,
    ) -> Self {
        Self {
            location,
            date_of_treatment,
            treatment_details: treatment_details.into(),
        }
    }

    /// Location where the treatment took place
    pub fn location(&self) -> LocationId {
        self.location
    }

    pub fn date_of_treatment(&self) -> NaiveDate {
        self.date_of_treatment
    }

    pub fn treatment_details(&self) -> &str {
        &self.treatment_details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_treatment_date() {
        let result = MedicalRecord::new(LocationId::new(), "2025/02/10", "Splint");
        assert!(matches!(
            result,
            Err(ReliefError::InvalidDate { field: "date of treatment", .. })
        ));
    }

    #[test]
    fn test_accessors() {
        let location = LocationId::new();
        let record = MedicalRecord::new(location, "2025-02-10", "Broken arm set").unwrap();
        assert_eq!(record.location(), location);
        assert_eq!(record.date_of_treatment().to_string(), "2025-02-10");
        assert_eq!(record.treatment_details(), "Broken arm set");
    }
}

//! Calendar dates and clocks
//!
//! Intake records use plain calendar dates written as `YYYY-MM-DD`. This
//! module owns the strict parser for that format and the [`Clock`]
//! abstraction the domain uses to decide what "today" is, so expiry rules can
//! be exercised against a simulated calendar.

use chrono::{DateTime, Days, NaiveDate, Utc};
use std::sync::RwLock;
use thiserror::Error;

/// The only accepted textual date layout
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors related to temporal values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date format '{value}'. Expected format: YYYY-MM-DD")]
    InvalidDateFormat { value: String },

    #[error("Date {later} must be the same as or before {earlier_bound}")]
    OutOfOrder {
        later: NaiveDate,
        earlier_bound: NaiveDate,
    },
}

/// Parses a strict `YYYY-MM-DD` date.
///
/// The text must be exactly four digits, a dash, two digits, a dash and two
/// digits, and must name a real calendar day.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, TemporalError> {
    let invalid = || TemporalError::InvalidDateFormat {
        value: value.to_string(),
    };

    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT).map_err(|_| invalid())
}

/// Ensures `earlier` does not fall after `bound`
pub fn ensure_not_after(earlier: NaiveDate, bound: NaiveDate) -> Result<(), TemporalError> {
    if earlier > bound {
        return Err(TemporalError::OutOfOrder {
            later: earlier,
            earlier_bound: bound,
        });
    }
    Ok(())
}

/// Source of the current date and time
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable date, used to simulate the passage of days
#[derive(Debug)]
pub struct FixedClock {
    today: RwLock<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: RwLock::new(today),
        }
    }

    /// Moves the clock to the given date
    pub fn set(&self, date: NaiveDate) {
        if let Ok(mut guard) = self.today.write() {
            *guard = date;
        }
    }

    /// Moves the clock forward by whole days
    pub fn advance_days(&self, days: u64) {
        if let Ok(mut guard) = self.today.write() {
            if let Some(next) = guard.checked_add_days(Days::new(days)) {
                *guard = next;
            }
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today()
            .and_hms_opt(12, 0, 0)
            .map(|naive| naive.and_utc())
            .unwrap_or_else(Utc::now)
    }

    fn today(&self) -> NaiveDate {
        match self.today.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_date() {
        let date = parse_iso_date("2025-01-18").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 18).unwrap());
        assert_eq!(date.to_string(), "2025-01-18");
    }

    #[test]
    fn test_parse_rejects_compact_and_slashed() {
        assert!(parse_iso_date("20250112").is_err());
        assert!(parse_iso_date("2025/02/10").is_err());
        assert!(parse_iso_date("18/01/2025").is_err());
        assert!(parse_iso_date("2025-1-18").is_err());
    }

    #[test]
    fn test_parse_rejects_impossible_day() {
        assert!(parse_iso_date("2025-02-30").is_err());
        assert!(parse_iso_date("15/13/2025").is_err());
    }

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        clock.advance_days(2);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 3).unwrap());
    }
}

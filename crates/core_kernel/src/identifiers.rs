//! Strongly-typed identifiers for domain entities
//!
//! Locations, supplies and inquiries use newtype wrappers around UUIDs.
//! Persons carry a sequential integer identity drawn from an
//! [`IdentitySequence`], which is owned by whoever owns the domain context
//! rather than by a global counter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new time-ordered identifier (v7)
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

define_id!(LocationId, "LOC");
define_id!(SupplyId, "SUP");
define_id!(InquiryId, "INQ");

/// Assigned social identifier of a registered person.
///
/// Values are handed out by an [`IdentitySequence`] and never change for the
/// lifetime of the person they were assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(u64);

impl PersonId {
    /// Returns the raw sequence value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PER-{}", self.0)
    }
}

/// Strictly increasing source of [`PersonId`] values.
///
/// The first identifier is 1. Identifiers are never reused, even when the
/// person they were issued to is discarded.
#[derive(Debug)]
pub struct IdentitySequence {
    last: AtomicU64,
}

impl IdentitySequence {
    /// Creates a sequence whose first identifier is 1
    pub fn new() -> Self {
        Self { last: AtomicU64::new(0) }
    }

    /// Issues the next identifier
    pub fn next_id(&self) -> PersonId {
        PersonId(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns the most recently issued identifier, if any
    pub fn last_issued(&self) -> Option<PersonId> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            n => Some(PersonId(n)),
        }
    }
}

impl Default for IdentitySequence {
    fn default() -> Self {
        Self::new()
    }
}

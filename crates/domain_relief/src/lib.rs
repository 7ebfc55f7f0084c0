//! Relief Intake Domain
//!
//! This crate implements the in-memory model of a disaster-relief intake
//! session: registered persons, their family groups and medical history,
//! shelters, supply units and missing-person inquiries.
//!
//! # Architecture
//!
//! The domain layer performs no I/O:
//! - **Entities**: Person, Location, FamilyGroup, Supply, Inquiry
//! - **Value Objects**: MedicalRecord, Inquirer, Holder
//! - **Registry**: owns every entity and performs cross-entity mutation
//! - **Allocation Engine**: moves supply units between owners
//!
//! # Supply Ownership
//!
//! ```text
//! Unowned -> Location <-> Person
//!        \-------------> Person
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_relief::{Holder, Location, ReliefRegistry, Supply};
//!
//! let mut registry = ReliefRegistry::default();
//! let freda = registry.register_person("Freda", "2025-01-18")?;
//! let shelter = registry.add_location(Location::new("Shelter A", "123 Main St"));
//! let water = registry.add_stock(Supply::water(1));
//!
//! registry.allocate(water, Holder::Unowned, Holder::Location(shelter))?;
//! registry.allocate(water, Holder::Location(shelter), Holder::Person(freda))?;
//! ```

pub mod error;
pub mod supply;
pub mod medical;
pub mod person;
pub mod family;
pub mod location;
pub mod inquiry;
pub mod registry;
pub mod allocation;

pub use error::ReliefError;
pub use supply::{Holder, Supply, SupplyKind, COT, PERSONAL_BELONGING, WATER};
pub use medical::MedicalRecord;
pub use person::{Gender, Person};
pub use family::FamilyGroup;
pub use location::Location;
pub use inquiry::{Inquirer, InquirerKind, Inquiry};
pub use registry::ReliefRegistry;
pub use allocation::AllocationEvent;

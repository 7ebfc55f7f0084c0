//! Repository implementations for the relief tables
//!
//! Each repository owns the SQL for one group of tables and maps rows to
//! plain structs. Queries are checked at runtime (`query_as` with
//! `FromRow`), so the crate builds without a live database.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Natural-key lookups return the surrogate key, or `None`
//! - Every statement runs on its own; there are no wrapping transactions
//! - SQLSTATE codes are mapped onto `DatabaseError` variants

pub mod person;
pub mod location;
pub mod supply;
pub mod inquiry;
pub mod medical;

pub use person::{NewPerson, PersonRepository, PersonRow};
pub use location::{LocationRepository, LocationRow, NewLocation};
pub use supply::{NewAllocation, NewSupply, SupplyRepository, SupplyRow};
pub use inquiry::{InquiryRepository, InquiryRow, NewInquirer, NewInquiry};
pub use medical::{MedicalRecordRepository, MedicalRecordRow, NewMedicalRecord};

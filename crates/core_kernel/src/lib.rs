//! Core Kernel - Foundational types for the relief intake system
//!
//! This crate provides the building blocks shared by the domain and
//! persistence crates:
//! - Strongly-typed identifiers and the person identity sequence
//! - Strict ISO calendar dates and an injectable clock
//! - Port marker traits for adapters

pub mod temporal;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use temporal::{parse_iso_date, Clock, FixedClock, SystemClock, TemporalError};
pub use identifiers::{IdentitySequence, InquiryId, LocationId, PersonId, SupplyId};
pub use error::CoreError;
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable};

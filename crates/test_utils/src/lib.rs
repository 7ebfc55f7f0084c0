//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! relief intake test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built dates, people and locations from intake scenarios
//! - `builders`: Builder patterns for persons, inquiries and store rows
//! - `database`: PostgreSQL container management for store tests
//! - `assertions`: Registry invariant checks with descriptive failures
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;

//! Infrastructure Database Layer
//!
//! Persistence for the relief intake registry on PostgreSQL using SQLx.
//!
//! # Architecture
//!
//! ```text
//! ReliefRegistry <-> PersistenceGateway <-> ReliefStore <-> repositories <-> PostgreSQL
//!                            |
//!                      DiagnosticsSink (failure log)
//! ```
//!
//! The gateway never raises: store failures go to the diagnostics sink and
//! surface as `false` or an empty collection.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, FailureLog, PersistenceGateway};
//! use infra_db::adapters::PostgresReliefStore;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/relief")).await?;
//! let mut gateway = PersistenceGateway::new(
//!     PostgresReliefStore::new(pool),
//!     FailureLog::new("relief-failures.log"),
//!     Arc::new(SystemClock),
//! );
//! let report = gateway.load_into(&mut registry).await;
//! ```

pub mod pool;
pub mod error;
pub mod config;
pub mod diagnostics;
pub mod repositories;
pub mod store;
pub mod adapters;
pub mod mapping;
pub mod gateway;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use config::ReliefConfig;
pub use diagnostics::{DiagnosticsSink, FailureEntry, FailureLog, MemoryFailureLog};
pub use store::ReliefStore;
pub use adapters::{MemoryReliefStore, PostgresReliefStore, StoreCounters};
pub use gateway::{
    LoadOutcome, LoadReport, LoadedInquiry, LoadedLocation, LoadedMedicalRecord, LoadedPerson,
    LoadedSupply, OrphanedRow, PersistenceGateway, StoredHolder,
};

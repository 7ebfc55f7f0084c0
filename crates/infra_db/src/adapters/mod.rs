//! Relief Store Adapters
//!
//! Implementations of the [`ReliefStore`](crate::store::ReliefStore) port.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{MemoryReliefStore, PostgresReliefStore};
//!
//! let store = PostgresReliefStore::new(pool);
//! let scratch = MemoryReliefStore::new();
//! ```

pub mod postgres;
pub mod memory;

pub use postgres::PostgresReliefStore;
pub use memory::{MemoryReliefStore, StoreCounters};

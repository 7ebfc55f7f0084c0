//! PostgreSQL Relief Store Adapter
//!
//! Implements [`ReliefStore`] on a SQLx pool by delegating to the table
//! repositories.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig};
//! use infra_db::adapters::PostgresReliefStore;
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/relief")).await?;
//! let store = PostgresReliefStore::new(pool);
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable};

use crate::error::DatabaseError;
use crate::repositories::{
    InquiryRepository, InquiryRow, LocationRepository, LocationRow, MedicalRecordRepository,
    MedicalRecordRow, NewAllocation, NewInquirer, NewInquiry, NewLocation, NewMedicalRecord,
    NewPerson, NewSupply, PersonRepository, PersonRow, SupplyRepository, SupplyRow,
};
use crate::store::ReliefStore;

const ADAPTER_ID: &str = "postgres-relief-store";

/// PostgreSQL-backed implementation of the ReliefStore port
#[derive(Debug, Clone)]
pub struct PostgresReliefStore {
    persons: PersonRepository,
    locations: LocationRepository,
    supplies: SupplyRepository,
    inquiries: InquiryRepository,
    medical_records: MedicalRecordRepository,
    pool: PgPool,
}

impl PostgresReliefStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            persons: PersonRepository::new(pool.clone()),
            locations: LocationRepository::new(pool.clone()),
            supplies: SupplyRepository::new(pool.clone()),
            inquiries: InquiryRepository::new(pool.clone()),
            medical_records: MedicalRecordRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresReliefStore {}

#[async_trait]
impl HealthCheckable for PostgresReliefStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ReliefStore for PostgresReliefStore {
    #[instrument(skip(self))]
    async fn find_person(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<i32>, DatabaseError> {
        self.persons.find_by_name(first_name, last_name).await
    }

    async fn insert_person(&self, person: &NewPerson) -> Result<i32, DatabaseError> {
        self.persons.insert(person).await
    }

    async fn update_person(&self, person_id: i32, person: &NewPerson) -> Result<(), DatabaseError> {
        self.persons.update(person_id, person).await
    }

    async fn list_persons(&self) -> Result<Vec<PersonRow>, DatabaseError> {
        self.persons.list().await
    }

    #[instrument(skip(self))]
    async fn find_location(&self, name: &str) -> Result<Option<i32>, DatabaseError> {
        self.locations.find_by_name(name).await
    }

    async fn insert_location(&self, location: &NewLocation) -> Result<i32, DatabaseError> {
        self.locations.insert(location).await
    }

    async fn update_location(
        &self,
        location_id: i32,
        location: &NewLocation,
    ) -> Result<(), DatabaseError> {
        self.locations.update(location_id, location).await
    }

    async fn list_locations(&self) -> Result<Vec<LocationRow>, DatabaseError> {
        self.locations.list().await
    }

    async fn insert_supply(&self, supply: &NewSupply) -> Result<i32, DatabaseError> {
        self.supplies.insert(supply).await
    }

    async fn list_supplies(&self) -> Result<Vec<SupplyRow>, DatabaseError> {
        self.supplies.list_with_latest_allocation().await
    }

    async fn insert_allocation(&self, allocation: &NewAllocation) -> Result<i32, DatabaseError> {
        self.supplies.insert_allocation(allocation).await
    }

    #[instrument(skip(self))]
    async fn delete_expired_water_allocations(
        &self,
        cutoff: NaiveDate,
    ) -> Result<u64, DatabaseError> {
        self.supplies.delete_expired_water_allocations(cutoff).await
    }

    async fn find_inquirer(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        phone_number: &str,
    ) -> Result<Option<i32>, DatabaseError> {
        self.inquiries
            .find_inquirer(first_name, last_name, phone_number)
            .await
    }

    async fn insert_inquirer(&self, inquirer: &NewInquirer) -> Result<i32, DatabaseError> {
        self.inquiries.insert_inquirer(inquirer).await
    }

    async fn insert_inquiry(&self, inquiry: &NewInquiry) -> Result<i32, DatabaseError> {
        self.inquiries.insert(inquiry).await
    }

    async fn list_inquiries(&self) -> Result<Vec<InquiryRow>, DatabaseError> {
        self.inquiries.list().await
    }

    async fn insert_medical_record(&self, record: &NewMedicalRecord) -> Result<i32, DatabaseError> {
        self.medical_records.insert(record).await
    }

    async fn list_medical_records(&self) -> Result<Vec<MedicalRecordRow>, DatabaseError> {
        self.medical_records.list().await
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

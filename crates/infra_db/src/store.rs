//! Relief store port
//!
//! [`ReliefStore`] is the row-level interface the persistence gateway drives.
//! It speaks in table rows and surrogate keys only; translating to and from
//! domain entities is the gateway's job.
//!
//! Two adapters implement it:
//! - [`PostgresReliefStore`](crate::adapters::PostgresReliefStore) on a SQLx pool
//! - [`MemoryReliefStore`](crate::adapters::MemoryReliefStore) for tests and dry runs

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, HealthCheckable};

use crate::error::DatabaseError;
use crate::repositories::{
    InquiryRow, LocationRow, MedicalRecordRow, NewAllocation, NewInquirer, NewInquiry,
    NewLocation, NewMedicalRecord, NewPerson, NewSupply, PersonRow, SupplyRow,
};

/// Row-level access to the relief tables
#[async_trait]
pub trait ReliefStore: DomainPort + HealthCheckable {
    /// Key of the person with this exact (first, last) name
    async fn find_person(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<i32>, DatabaseError>;

    async fn insert_person(&self, person: &NewPerson) -> Result<i32, DatabaseError>;

    async fn update_person(&self, person_id: i32, person: &NewPerson) -> Result<(), DatabaseError>;

    async fn list_persons(&self) -> Result<Vec<PersonRow>, DatabaseError>;

    /// Key of the location with this exact name
    async fn find_location(&self, name: &str) -> Result<Option<i32>, DatabaseError>;

    async fn insert_location(&self, location: &NewLocation) -> Result<i32, DatabaseError>;

    async fn update_location(
        &self,
        location_id: i32,
        location: &NewLocation,
    ) -> Result<(), DatabaseError>;

    async fn list_locations(&self) -> Result<Vec<LocationRow>, DatabaseError>;

    async fn insert_supply(&self, supply: &NewSupply) -> Result<i32, DatabaseError>;

    /// Every supply joined with its most recent allocation
    async fn list_supplies(&self) -> Result<Vec<SupplyRow>, DatabaseError>;

    async fn insert_allocation(&self, allocation: &NewAllocation) -> Result<i32, DatabaseError>;

    /// Deletes every allocation row of water whose latest allocation went to
    /// a person before `cutoff`. Returns the number of rows deleted.
    async fn delete_expired_water_allocations(&self, cutoff: NaiveDate)
        -> Result<u64, DatabaseError>;

    /// Key of the inquirer with this exact name and phone number
    async fn find_inquirer(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        phone_number: &str,
    ) -> Result<Option<i32>, DatabaseError>;

    async fn insert_inquirer(&self, inquirer: &NewInquirer) -> Result<i32, DatabaseError>;

    async fn insert_inquiry(&self, inquiry: &NewInquiry) -> Result<i32, DatabaseError>;

    async fn list_inquiries(&self) -> Result<Vec<InquiryRow>, DatabaseError>;

    async fn insert_medical_record(&self, record: &NewMedicalRecord) -> Result<i32, DatabaseError>;

    async fn list_medical_records(&self) -> Result<Vec<MedicalRecordRow>, DatabaseError>;

    /// Ends the session; later operations fail with a connection error
    async fn close(&self);
}

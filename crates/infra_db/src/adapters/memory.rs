//! In-memory Relief Store Adapter
//!
//! Holds every table as a vector behind a mutex and reproduces the
//! PostgreSQL adapter's semantics: serial keys, NULL-matching natural keys,
//! foreign keys, the single-holder allocation check and the expiry sweep.
//! It also counts writes and can be switched into a failing mode, which
//! makes it the store of choice for gateway tests.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::{Mutex, MutexGuard};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable};

use crate::error::DatabaseError;
use crate::repositories::{
    InquiryRow, LocationRow, MedicalRecordRow, NewAllocation, NewInquirer, NewInquiry,
    NewLocation, NewMedicalRecord, NewPerson, NewSupply, PersonRow, SupplyRow,
};
use crate::store::ReliefStore;

const ADAPTER_ID: &str = "memory-relief-store";

/// Write counts per operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounters {
    pub person_inserts: usize,
    pub person_updates: usize,
    pub location_inserts: usize,
    pub location_updates: usize,
    pub supply_inserts: usize,
    pub allocation_inserts: usize,
    pub inquirer_inserts: usize,
    pub inquiry_inserts: usize,
    pub medical_record_inserts: usize,
}

#[derive(Debug, Default)]
struct Tables {
    next_key: i32,
    persons: Vec<PersonRow>,
    locations: Vec<LocationRow>,
    supplies: Vec<(i32, NewSupply)>,
    allocations: Vec<(i32, NewAllocation)>,
    inquirers: Vec<(i32, NewInquirer)>,
    inquiries: Vec<(i32, NewInquiry)>,
    medical_records: Vec<MedicalRecordRow>,
    counters: StoreCounters,
    failure: Option<String>,
    closed: bool,
}

impl Tables {
    fn key(&mut self) -> i32 {
        self.next_key += 1;
        self.next_key
    }

    fn ready(&self) -> Result<(), DatabaseError> {
        if self.closed {
            return Err(DatabaseError::Closed);
        }
        match &self.failure {
            Some(message) => Err(DatabaseError::ConnectionFailed(message.clone())),
            None => Ok(()),
        }
    }

    fn has_person(&self, key: i32) -> bool {
        self.persons.iter().any(|p| p.person_id == key)
    }

    fn has_location(&self, key: i32) -> bool {
        self.locations.iter().any(|l| l.location_id == key)
    }

    fn latest_allocation(&self, supply_id: i32) -> Option<&NewAllocation> {
        self.allocations
            .iter()
            .filter(|(_, a)| a.supply_id == supply_id)
            .max_by_key(|(key, a)| (a.allocation_date, *key))
            .map(|(_, a)| a)
    }
}

/// In-memory implementation of the ReliefStore port
#[derive(Debug, Default)]
pub struct MemoryReliefStore {
    tables: Mutex<Tables>,
}

impl MemoryReliefStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Makes every following operation fail with a connection error
    pub fn fail_with(&self, message: impl Into<String>) {
        self.tables().failure = Some(message.into());
    }

    /// Leaves failing mode
    pub fn recover(&self) {
        self.tables().failure = None;
    }

    pub fn is_closed(&self) -> bool {
        self.tables().closed
    }

    pub fn counters(&self) -> StoreCounters {
        self.tables().counters
    }

    /// Number of rows in `supply_allocation`
    pub fn allocation_count(&self) -> usize {
        self.tables().allocations.len()
    }

    /// Allocation rows for one supply, oldest first
    pub fn allocations_for(&self, supply_id: i32) -> Vec<NewAllocation> {
        self.tables()
            .allocations
            .iter()
            .filter(|(_, a)| a.supply_id == supply_id)
            .map(|(_, a)| a.clone())
            .collect()
    }
}

impl DomainPort for MemoryReliefStore {}

#[async_trait]
impl HealthCheckable for MemoryReliefStore {
    async fn health_check(&self) -> HealthCheckResult {
        let (status, message) = match self.tables().ready() {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };
        HealthCheckResult {
            adapter_id: ADAPTER_ID.to_string(),
            status,
            latency_ms: 0,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ReliefStore for MemoryReliefStore {
    async fn find_person(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<i32>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables
            .persons
            .iter()
            .find(|p| p.first_name == first_name && p.last_name.as_deref() == last_name)
            .map(|p| p.person_id))
    }

    async fn insert_person(&self, person: &NewPerson) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        let key = tables.key();
        tables.persons.push(person.clone().into_row(key));
        tables.counters.person_inserts += 1;
        Ok(key)
    }

    async fn update_person(&self, person_id: i32, person: &NewPerson) -> Result<(), DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        let row = tables
            .persons
            .iter_mut()
            .find(|p| p.person_id == person_id)
            .ok_or_else(|| DatabaseError::not_found("person", person_id))?;
        *row = person.clone().into_row(person_id);
        tables.counters.person_updates += 1;
        Ok(())
    }

    async fn list_persons(&self) -> Result<Vec<PersonRow>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables.persons.clone())
    }

    async fn find_location(&self, name: &str) -> Result<Option<i32>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables
            .locations
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.location_id))
    }

    async fn insert_location(&self, location: &NewLocation) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        let key = tables.key();
        tables.locations.push(LocationRow {
            location_id: key,
            name: location.name.clone(),
            address: location.address.clone(),
        });
        tables.counters.location_inserts += 1;
        Ok(key)
    }

    async fn update_location(
        &self,
        location_id: i32,
        location: &NewLocation,
    ) -> Result<(), DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        let row = tables
            .locations
            .iter_mut()
            .find(|l| l.location_id == location_id)
            .ok_or_else(|| DatabaseError::not_found("location", location_id))?;
        row.name = location.name.clone();
        row.address = location.address.clone();
        tables.counters.location_updates += 1;
        Ok(())
    }

    async fn list_locations(&self) -> Result<Vec<LocationRow>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables.locations.clone())
    }

    async fn insert_supply(&self, supply: &NewSupply) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        if supply.quantity < 0 {
            return Err(DatabaseError::ConstraintViolation(
                "supply quantity must not be negative".to_string(),
            ));
        }
        let key = tables.key();
        tables.supplies.push((key, supply.clone()));
        tables.counters.supply_inserts += 1;
        Ok(key)
    }

    async fn list_supplies(&self) -> Result<Vec<SupplyRow>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables
            .supplies
            .iter()
            .map(|(key, supply)| {
                let latest = tables.latest_allocation(*key);
                SupplyRow {
                    supply_id: *key,
                    supply_type: supply.supply_type.clone(),
                    quantity: supply.quantity,
                    comments: supply.comments.clone(),
                    allocated_person_id: latest.and_then(|a| a.person_id),
                    allocated_location_id: latest.and_then(|a| a.location_id),
                    allocation_date: latest.map(|a| a.allocation_date),
                }
            })
            .collect())
    }

    async fn insert_allocation(&self, allocation: &NewAllocation) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        if allocation.person_id.is_some() == allocation.location_id.is_some() {
            return Err(DatabaseError::ConstraintViolation(
                "allocation must reference exactly one of person or location".to_string(),
            ));
        }
        if !tables.supplies.iter().any(|(k, _)| *k == allocation.supply_id) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "supply {} does not exist",
                allocation.supply_id
            )));
        }
        if let Some(person) = allocation.person_id.filter(|p| !tables.has_person(*p)) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "person {} does not exist",
                person
            )));
        }
        if let Some(location) = allocation.location_id.filter(|l| !tables.has_location(*l)) {
            return Err(DatabaseError::ForeignKeyViolation(format!(
                "location {} does not exist",
                location
            )));
        }
        let key = tables.key();
        tables.allocations.push((key, allocation.clone()));
        tables.counters.allocation_inserts += 1;
        Ok(key)
    }

    async fn delete_expired_water_allocations(
        &self,
        cutoff: NaiveDate,
    ) -> Result<u64, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        let expired: Vec<i32> = tables
            .supplies
            .iter()
            .filter(|(_, s)| s.supply_type == domain_relief::WATER)
            .filter(|(key, _)| {
                tables
                    .latest_allocation(*key)
                    .map(|a| a.person_id.is_some() && a.allocation_date < cutoff)
                    .unwrap_or(false)
            })
            .map(|(key, _)| *key)
            .collect();

        let before = tables.allocations.len();
        tables
            .allocations
            .retain(|(_, a)| !expired.contains(&a.supply_id));
        Ok((before - tables.allocations.len()) as u64)
    }

    async fn find_inquirer(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        phone_number: &str,
    ) -> Result<Option<i32>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables
            .inquirers
            .iter()
            .find(|(_, i)| {
                i.first_name == first_name
                    && i.last_name.as_deref() == last_name
                    && i.phone_number == phone_number
            })
            .map(|(key, _)| *key))
    }

    async fn insert_inquirer(&self, inquirer: &NewInquirer) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        let key = tables.key();
        tables.inquirers.push((key, inquirer.clone()));
        tables.counters.inquirer_inserts += 1;
        Ok(key)
    }

    async fn insert_inquiry(&self, inquiry: &NewInquiry) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        if !tables.inquirers.iter().any(|(k, _)| *k == inquiry.inquirer_id)
            || !tables.has_person(inquiry.seeking_id)
            || !tables.has_location(inquiry.location_id)
        {
            return Err(DatabaseError::ForeignKeyViolation(
                "inquiry references a missing inquirer, person or location".to_string(),
            ));
        }
        let key = tables.key();
        tables.inquiries.push((key, inquiry.clone()));
        tables.counters.inquiry_inserts += 1;
        Ok(key)
    }

    async fn list_inquiries(&self) -> Result<Vec<InquiryRow>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables
            .inquiries
            .iter()
            .filter_map(|(key, inquiry)| {
                let (_, inquirer) = tables
                    .inquirers
                    .iter()
                    .find(|(k, _)| *k == inquiry.inquirer_id)?;
                Some(InquiryRow {
                    inquiry_id: *key,
                    inquirer_id: inquiry.inquirer_id,
                    inquirer_first_name: inquirer.first_name.clone(),
                    inquirer_last_name: inquirer.last_name.clone(),
                    phone_number: inquirer.phone_number.clone(),
                    inquirer_info: inquirer.info.clone(),
                    seeking_id: inquiry.seeking_id,
                    location_id: inquiry.location_id,
                    date_of_inquiry: inquiry.date_of_inquiry,
                    comments: inquiry.comments.clone(),
                })
            })
            .collect())
    }

    async fn insert_medical_record(&self, record: &NewMedicalRecord) -> Result<i32, DatabaseError> {
        let mut tables = self.tables();
        tables.ready()?;
        if !tables.has_person(record.person_id) || !tables.has_location(record.location_id) {
            return Err(DatabaseError::ForeignKeyViolation(
                "medical record references a missing person or location".to_string(),
            ));
        }
        let key = tables.key();
        tables.medical_records.push(MedicalRecordRow {
            medical_record_id: key,
            location_id: record.location_id,
            person_id: record.person_id,
            date_of_treatment: record.date_of_treatment,
            treatment_details: record.treatment_details.clone(),
        });
        tables.counters.medical_record_inserts += 1;
        Ok(key)
    }

    async fn list_medical_records(&self) -> Result<Vec<MedicalRecordRow>, DatabaseError> {
        let tables = self.tables();
        tables.ready()?;
        Ok(tables.medical_records.clone())
    }

    async fn close(&self) {
        self.tables().closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(first: &str, last: Option<&str>) -> NewPerson {
        NewPerson {
            first_name: first.to_string(),
            last_name: last.map(str::to_string),
            date_of_birth: None,
            gender: None,
            entry_date: date(2025, 1, 18),
            comments: None,
            family_group: None,
        }
    }

    #[tokio::test]
    async fn test_null_last_name_matches_only_null() {
        let store = MemoryReliefStore::new();
        let key = store.insert_person(&person("Test", None)).await.unwrap();
        store.insert_person(&person("Test", Some("Person"))).await.unwrap();

        assert_eq!(store.find_person("Test", None).await.unwrap(), Some(key));
        assert_ne!(store.find_person("Test", Some("Person")).await.unwrap(), Some(key));
        assert_eq!(store.find_person("Other", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_allocation_requires_single_holder() {
        let store = MemoryReliefStore::new();
        let supply = store
            .insert_supply(&NewSupply {
                supply_type: "water".to_string(),
                quantity: 1,
                comments: None,
            })
            .await
            .unwrap();
        let result = store
            .insert_allocation(&NewAllocation {
                supply_id: supply,
                person_id: None,
                location_id: None,
                allocation_date: date(2025, 1, 1),
            })
            .await;
        assert!(result.unwrap_err().is_constraint_violation());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_operations() {
        let store = MemoryReliefStore::new();
        store.close().await;
        assert!(store.is_closed());
        assert!(matches!(store.list_persons().await, Err(DatabaseError::Closed)));
        assert!(!store.health_check().await.is_healthy());
    }
}

//! Persistence gateway
//!
//! [`PersistenceGateway`] keeps the in-memory registry and the relational
//! store in step. It resolves database identity by natural key, decides
//! between insert and update, rebuilds the registry on load and runs the
//! store-level water expiry sweep.
//!
//! No gateway operation returns an error. Store failures are written to the
//! [`DiagnosticsSink`] and surface as `false` or an empty collection; rows
//! that cannot be turned back into entities are skipped and reported as
//! [`OrphanedRow`]s.
//!
//! # Load cycle
//!
//! ```text
//! sweep expired water -> locations -> persons -> supplies
//!                     -> medical records -> inquiries
//! ```

use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{
    Clock, HealthCheckResult, HealthCheckable, IdentitySequence, LocationId, PersonId, SupplyId,
};
use domain_relief::{
    AllocationEvent, Holder, Inquiry, Location, MedicalRecord, Person, ReliefRegistry, Supply,
};

use crate::diagnostics::DiagnosticsSink;
use crate::error::DatabaseError;
use crate::mapping;
use crate::repositories::{NewAllocation, NewInquiry, NewMedicalRecord};
use crate::store::ReliefStore;

/// A stored row skipped during load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanedRow {
    pub table: &'static str,
    pub key: i32,
    pub reason: String,
}

impl OrphanedRow {
    fn new(table: &'static str, key: i32, reason: impl Into<String>) -> Self {
        Self {
            table,
            key,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for OrphanedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}: {}", self.table, self.key, self.reason)
    }
}

/// Loaded items together with the rows that had to be skipped
#[derive(Debug)]
pub struct LoadOutcome<T> {
    pub items: Vec<T>,
    pub orphans: Vec<OrphanedRow>,
}

impl<T> Default for LoadOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            orphans: Vec::new(),
        }
    }
}

impl<T> LoadOutcome<T> {
    fn orphan(&mut self, table: &'static str, key: i32, reason: impl Into<String>) {
        self.orphans.push(OrphanedRow::new(table, key, reason));
    }
}

#[derive(Debug)]
pub struct LoadedLocation {
    pub key: i32,
    pub location: Location,
}

/// A person row with the family group recorded against it
#[derive(Debug)]
pub struct LoadedPerson {
    pub key: i32,
    pub person: Person,
    pub family_group: Option<String>,
}

/// Holder named by a supply's most recent allocation row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredHolder {
    Unallocated,
    Person(i32),
    Location(i32),
}

#[derive(Debug)]
pub struct LoadedSupply {
    pub key: i32,
    pub supply: Supply,
    pub holder: StoredHolder,
    pub allocation_date: Option<NaiveDate>,
}

#[derive(Debug)]
pub struct LoadedMedicalRecord {
    pub key: i32,
    pub person: PersonId,
    pub record: MedicalRecord,
}

#[derive(Debug)]
pub struct LoadedInquiry {
    pub key: i32,
    pub inquiry: Inquiry,
}

/// Summary of a full load cycle
#[derive(Debug, Default)]
pub struct LoadReport {
    pub expired_allocations_removed: u64,
    pub locations: usize,
    pub persons: usize,
    pub supplies: usize,
    pub medical_records: usize,
    pub inquiries: usize,
    pub orphans: Vec<OrphanedRow>,
}

/// Synchronizes a [`ReliefRegistry`] with a [`ReliefStore`]
pub struct PersistenceGateway<S, D> {
    store: S,
    diagnostics: D,
    clock: Arc<dyn Clock>,
    supply_keys: HashMap<SupplyId, i32>,
}

impl<S, D> PersistenceGateway<S, D>
where
    S: ReliefStore,
    D: DiagnosticsSink,
{
    pub fn new(store: S, diagnostics: D, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            diagnostics,
            clock,
            supply_keys: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    /// Stored key of a supply saved or loaded through this gateway
    pub fn supply_key(&self, supply: SupplyId) -> Option<i32> {
        self.supply_keys.get(&supply).copied()
    }

    pub async fn health_check(&self) -> HealthCheckResult {
        self.store.health_check().await
    }

    fn fail(&self, operation: &str, error: impl fmt::Display) {
        self.diagnostics.record(operation, &error.to_string());
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    pub async fn load_locations(&mut self) -> Vec<LoadedLocation> {
        match self.store.list_locations().await {
            Ok(rows) => rows
                .iter()
                .map(|row| LoadedLocation {
                    key: row.location_id,
                    location: mapping::location_from_row(row),
                })
                .collect(),
            Err(e) => {
                self.fail("load locations", e);
                Vec::new()
            }
        }
    }

    /// Loads every person row, drawing identifiers from `ids`. Rows that
    /// fail validation are reported as orphans.
    pub async fn load_persons(&mut self, ids: &IdentitySequence) -> LoadOutcome<LoadedPerson> {
        let mut outcome = LoadOutcome::default();
        let rows = match self.store.list_persons().await {
            Ok(rows) => rows,
            Err(e) => {
                self.fail("load persons", e);
                return outcome;
            }
        };

        for row in rows {
            match mapping::person_from_row(ids, &row) {
                Ok(person) => outcome.items.push(LoadedPerson {
                    key: row.person_id,
                    person,
                    family_group: row.family_group,
                }),
                Err(e) => outcome.orphan("person", row.person_id, e.to_string()),
            }
        }
        outcome
    }

    /// Loads every supply with the holder named by its latest allocation
    pub async fn load_supplies(&mut self) -> LoadOutcome<LoadedSupply> {
        let mut outcome = LoadOutcome::default();
        let rows = match self.store.list_supplies().await {
            Ok(rows) => rows,
            Err(e) => {
                self.fail("load supplies", e);
                return outcome;
            }
        };

        for row in rows {
            let supply = match mapping::supply_from_row(&row) {
                Ok(supply) => supply,
                Err(e) => {
                    outcome.orphan("supply", row.supply_id, e.to_string());
                    continue;
                }
            };
            let holder = match (row.allocated_person_id, row.allocated_location_id) {
                (Some(person), _) => StoredHolder::Person(person),
                (None, Some(location)) => StoredHolder::Location(location),
                (None, None) => StoredHolder::Unallocated,
            };
            outcome.items.push(LoadedSupply {
                key: row.supply_id,
                supply,
                holder,
                allocation_date: row.allocation_date,
            });
        }
        outcome
    }

    pub async fn load_medical_records(
        &mut self,
        persons_by_key: &HashMap<i32, PersonId>,
        locations_by_key: &HashMap<i32, LocationId>,
    ) -> LoadOutcome<LoadedMedicalRecord> {
        let mut outcome = LoadOutcome::default();
        let rows = match self.store.list_medical_records().await {
            Ok(rows) => rows,
            Err(e) => {
                self.fail("load medical records", e);
                return outcome;
            }
        };

        for row in rows {
            let Some(&person) = persons_by_key.get(&row.person_id) else {
                outcome.orphan(
                    "medical_record",
                    row.medical_record_id,
                    format!("unresolved person key {}", row.person_id),
                );
                continue;
            };
            let Some(&location) = locations_by_key.get(&row.location_id) else {
                outcome.orphan(
                    "medical_record",
                    row.medical_record_id,
                    format!("unresolved location key {}", row.location_id),
                );
                continue;
            };
            outcome.items.push(LoadedMedicalRecord {
                key: row.medical_record_id,
                person,
                record: MedicalRecord::from_date(location, row.date_of_treatment, row.treatment_details),
            });
        }
        outcome
    }

    pub async fn load_inquiries(
        &mut self,
        persons_by_key: &HashMap<i32, PersonId>,
        locations_by_key: &HashMap<i32, LocationId>,
    ) -> LoadOutcome<LoadedInquiry> {
        let mut outcome = LoadOutcome::default();
        let rows = match self.store.list_inquiries().await {
            Ok(rows) => rows,
            Err(e) => {
                self.fail("load inquiries", e);
                return outcome;
            }
        };

        for row in rows {
            let Some(&missing) = persons_by_key.get(&row.seeking_id) else {
                outcome.orphan(
                    "inquiry",
                    row.inquiry_id,
                    format!("unresolved person key {}", row.seeking_id),
                );
                continue;
            };
            let Some(&location) = locations_by_key.get(&row.location_id) else {
                outcome.orphan(
                    "inquiry",
                    row.inquiry_id,
                    format!("unresolved location key {}", row.location_id),
                );
                continue;
            };
            let inquirer = match mapping::inquirer_from_row(&row) {
                Ok(inquirer) => inquirer,
                Err(e) => {
                    outcome.orphan("inquiry", row.inquiry_id, e.to_string());
                    continue;
                }
            };
            let inquiry = Inquiry::from_date(
                inquirer,
                missing,
                row.date_of_inquiry,
                row.comments.unwrap_or_default(),
                location,
            );
            outcome.items.push(LoadedInquiry {
                key: row.inquiry_id,
                inquiry,
            });
        }
        outcome
    }

    /// Runs a full load cycle into `registry`
    #[instrument(skip_all)]
    pub async fn load_into(&mut self, registry: &mut ReliefRegistry) -> LoadReport {
        let mut report = LoadReport {
            expired_allocations_removed: self.sweep_expired_water().await.unwrap_or(0),
            ..LoadReport::default()
        };

        let mut locations_by_key = HashMap::new();
        for loaded in self.load_locations().await {
            let id = registry.add_location(loaded.location);
            locations_by_key.insert(loaded.key, id);
            report.locations += 1;
        }

        let persons = self.load_persons(registry.ids()).await;
        report.orphans.extend(persons.orphans);
        let mut persons_by_key = HashMap::new();
        for loaded in persons.items {
            let id = match registry.adopt_person(loaded.person) {
                Ok(id) => id,
                Err(e) => {
                    report.orphans.push(OrphanedRow::new("person", loaded.key, e.to_string()));
                    continue;
                }
            };
            persons_by_key.insert(loaded.key, id);
            report.persons += 1;

            if let Some(group) = loaded.family_group {
                let created = if registry.family_group(&group).is_some() {
                    Ok(())
                } else {
                    registry.create_family_group(group.clone())
                };
                if let Err(e) = created.and_then(|()| registry.add_family_member(&group, id)) {
                    report.orphans.push(OrphanedRow::new("person", loaded.key, e.to_string()));
                }
            }
        }

        let supplies = self.load_supplies().await;
        report.orphans.extend(supplies.orphans);
        for loaded in supplies.items {
            let holder = match loaded.holder {
                StoredHolder::Unallocated => Some(Holder::Unowned),
                StoredHolder::Person(key) => persons_by_key.get(&key).map(|id| Holder::Person(*id)),
                StoredHolder::Location(key) => {
                    locations_by_key.get(&key).map(|id| Holder::Location(*id))
                }
            };
            let Some(holder) = holder else {
                report.orphans.push(OrphanedRow::new(
                    "supply",
                    loaded.key,
                    format!("unresolved holder {:?}", loaded.holder),
                ));
                continue;
            };

            let id = loaded.supply.id();
            match registry.restore_supply(loaded.supply, holder, loaded.allocation_date) {
                Ok(()) => {
                    self.supply_keys.insert(id, loaded.key);
                    report.supplies += 1;
                }
                Err(e) => report.orphans.push(OrphanedRow::new("supply", loaded.key, e.to_string())),
            }
        }

        let records = self
            .load_medical_records(&persons_by_key, &locations_by_key)
            .await;
        report.orphans.extend(records.orphans);
        for loaded in records.items {
            match registry.add_medical_record(loaded.person, loaded.record) {
                Ok(()) => report.medical_records += 1,
                Err(e) => report
                    .orphans
                    .push(OrphanedRow::new("medical_record", loaded.key, e.to_string())),
            }
        }

        let inquiries = self.load_inquiries(&persons_by_key, &locations_by_key).await;
        report.orphans.extend(inquiries.orphans);
        for loaded in inquiries.items {
            match registry.add_inquiry(loaded.inquiry) {
                Ok(_) => report.inquiries += 1,
                Err(e) => report
                    .orphans
                    .push(OrphanedRow::new("inquiry", loaded.key, e.to_string())),
            }
        }

        for orphan in &report.orphans {
            warn!(%orphan, "Skipped stored row");
        }
        info!(
            locations = report.locations,
            persons = report.persons,
            supplies = report.supplies,
            medical_records = report.medical_records,
            inquiries = report.inquiries,
            orphans = report.orphans.len(),
            "Load cycle complete"
        );
        report
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Updates the stored person with the same first and last name, or
    /// inserts a new row when there is none
    #[instrument(skip_all, fields(person = %person.full_name()))]
    pub async fn save_person(&mut self, person: &Person) -> bool {
        let operation = format!("save person {}", person.full_name());
        let row = mapping::new_person(person);

        let result = match self.store.find_person(person.first_name(), person.last_name()).await {
            Ok(Some(key)) => {
                debug!(key, "Updating stored person");
                self.store.update_person(key, &row).await
            }
            Ok(None) => {
                debug!("No stored match, inserting person");
                self.store.insert_person(&row).await.map(|_| ())
            }
            Err(e) => Err(e),
        };

        self.settle(&operation, result)
    }

    /// Updates the stored location with the same name, or inserts one
    #[instrument(skip_all, fields(location = location.name()))]
    pub async fn save_location(&mut self, location: &Location) -> bool {
        let operation = format!("save location {}", location.name());
        let row = mapping::new_location(location);

        let result = match self.store.find_location(location.name()).await {
            Ok(Some(key)) => self.store.update_location(key, &row).await,
            Ok(None) => self.store.insert_location(&row).await.map(|_| ()),
            Err(e) => Err(e),
        };

        self.settle(&operation, result)
    }

    /// Inserts a supply row; every call inserts a new row
    pub async fn save_supply(&mut self, supply: &Supply) -> bool {
        let operation = format!("save supply {}", supply.type_name());
        let row = match mapping::new_supply(supply) {
            Ok(row) => row,
            Err(e) => {
                self.fail(&operation, e);
                return false;
            }
        };
        match self.store.insert_supply(&row).await {
            Ok(key) => {
                self.supply_keys.insert(supply.id(), key);
                true
            }
            Err(e) => {
                self.fail(&operation, e);
                false
            }
        }
    }

    /// Appends an allocation row for a saved supply.
    ///
    /// The row links to `person` when one is given, otherwise to `location`.
    pub async fn allocate_supply(
        &mut self,
        supply: &Supply,
        person: Option<&Person>,
        location: &Location,
    ) -> bool {
        let operation = format!("allocate supply {}", supply.type_name());
        let today = self.clock.today();

        let target = match person {
            Some(person) => self.person_key(person).await.map(|key| (Some(key), None)),
            None => self.location_key(location).await.map(|key| (None, Some(key))),
        };
        let date = match person {
            Some(_) => supply.allocation_date().unwrap_or(today),
            None => today,
        };

        let result = match target {
            Ok((person_id, location_id)) => self.insert_allocation(supply.id(), person_id, location_id, date).await,
            Err(e) => Err(e),
        };
        self.settle(&operation, result)
    }

    /// Persists an allocation made through the registry
    pub async fn record_allocation(&mut self, registry: &ReliefRegistry, event: &AllocationEvent) -> bool {
        let operation = format!("record allocation {}", event.supply);

        let target = match event.to {
            Holder::Person(id) => match registry.person(id) {
                Some(person) => self.person_key(person).await.map(|key| (Some(key), None)),
                None => Err(DatabaseError::not_found("person", id)),
            },
            Holder::Location(id) => match registry.location(id) {
                Some(location) => self.location_key(location).await.map(|key| (None, Some(key))),
                None => Err(DatabaseError::not_found("location", id)),
            },
            Holder::Unowned => Err(DatabaseError::QueryFailed(
                "allocations to unplaced stock are not stored".to_string(),
            )),
        };

        let result = match target {
            Ok((person_id, location_id)) => {
                self.insert_allocation(event.supply, person_id, location_id, event.date)
                    .await
            }
            Err(e) => Err(e),
        };
        self.settle(&operation, result)
    }

    /// Stores an inquiry, reusing the inquirer row with the same name and
    /// phone number
    pub async fn save_inquiry(&mut self, registry: &ReliefRegistry, inquiry: &Inquiry) -> bool {
        let operation = format!("save inquiry {}", inquiry.id());
        let result = self.try_save_inquiry(registry, inquiry).await;
        self.settle(&operation, result)
    }

    async fn try_save_inquiry(
        &self,
        registry: &ReliefRegistry,
        inquiry: &Inquiry,
    ) -> Result<(), DatabaseError> {
        let inquirer = inquiry.inquirer();
        let inquirer_id = match self
            .store
            .find_inquirer(inquirer.first_name(), inquirer.last_name(), inquirer.phone())
            .await?
        {
            Some(key) => key,
            None => {
                self.store
                    .insert_inquirer(&mapping::new_inquirer(inquirer))
                    .await?
            }
        };

        let missing = registry
            .person(inquiry.missing_person())
            .ok_or_else(|| DatabaseError::not_found("person", inquiry.missing_person()))?;
        let location = registry
            .location(inquiry.last_known_location())
            .ok_or_else(|| DatabaseError::not_found("location", inquiry.last_known_location()))?;

        let row = NewInquiry {
            inquirer_id,
            seeking_id: self.person_key(missing).await?,
            location_id: self.location_key(location).await?,
            date_of_inquiry: inquiry.date_of_inquiry(),
            comments: Some(inquiry.info_provided().to_string()),
        };
        self.store.insert_inquiry(&row).await.map(|_| ())
    }

    /// Inserts a medical record for a saved person and location
    pub async fn save_medical_record(
        &mut self,
        registry: &ReliefRegistry,
        person: PersonId,
        record: &MedicalRecord,
    ) -> bool {
        let operation = format!("save medical record for {}", person);
        let result = self.try_save_medical_record(registry, person, record).await;
        self.settle(&operation, result)
    }

    async fn try_save_medical_record(
        &self,
        registry: &ReliefRegistry,
        person: PersonId,
        record: &MedicalRecord,
    ) -> Result<(), DatabaseError> {
        let person = registry
            .person(person)
            .ok_or_else(|| DatabaseError::not_found("person", person))?;
        let location = registry
            .location(record.location())
            .ok_or_else(|| DatabaseError::not_found("location", record.location()))?;

        let row = NewMedicalRecord {
            location_id: self.location_key(location).await?,
            person_id: self.person_key(person).await?,
            date_of_treatment: record.date_of_treatment(),
            treatment_details: record.treatment_details().to_string(),
        };
        self.store.insert_medical_record(&row).await.map(|_| ())
    }

    /// Deletes the allocation history of water held by a person since
    /// before yesterday. Location-held water is never swept.
    pub async fn remove_expired_water(&mut self) -> bool {
        self.sweep_expired_water().await.is_some()
    }

    async fn sweep_expired_water(&mut self) -> Option<u64> {
        let today = self.clock.today();
        let Some(cutoff) = today.checked_sub_days(Days::new(1)) else {
            self.fail("remove expired water", format!("no day before {}", today));
            return None;
        };

        match self.store.delete_expired_water_allocations(cutoff).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, %cutoff, "Expired water allocations removed");
                }
                Some(removed)
            }
            Err(e) => {
                self.fail("remove expired water", e);
                None
            }
        }
    }

    /// Ends the store session
    pub async fn close(&mut self) {
        self.store.close().await;
        info!("Persistence session closed");
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn settle(&self, operation: &str, result: Result<(), DatabaseError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                self.fail(operation, e);
                false
            }
        }
    }

    async fn person_key(&self, person: &Person) -> Result<i32, DatabaseError> {
        self.store
            .find_person(person.first_name(), person.last_name())
            .await?
            .ok_or_else(|| DatabaseError::not_found("person", person.full_name()))
    }

    async fn location_key(&self, location: &Location) -> Result<i32, DatabaseError> {
        self.store
            .find_location(location.name())
            .await?
            .ok_or_else(|| DatabaseError::not_found("location", location.name()))
    }

    async fn insert_allocation(
        &self,
        supply: SupplyId,
        person_id: Option<i32>,
        location_id: Option<i32>,
        allocation_date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        let supply_id = self
            .supply_keys
            .get(&supply)
            .copied()
            .ok_or_else(|| DatabaseError::not_found("supply", supply))?;
        let row = NewAllocation {
            supply_id,
            person_id,
            location_id,
            allocation_date,
        };
        self.store.insert_allocation(&row).await.map(|_| ())
    }
}

//! Supply allocation engine
//!
//! Moves supply units between the registry's unplaced stock, locations and
//! persons. Every move is checked before anything is removed, so a rejected
//! allocation leaves both owners exactly as they were.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{PersonId, SupplyId};

use crate::error::ReliefError;
use crate::location::ensure_locatable;
use crate::registry::ReliefRegistry;
use crate::supply::{self, Holder, Supply};

/// A completed supply move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEvent {
    pub supply: SupplyId,
    pub from: Holder,
    pub to: Holder,
    pub date: NaiveDate,
}

impl ReliefRegistry {
    /// Places a new unit in the unplaced stock
    pub fn add_stock(&mut self, mut supply: Supply) -> SupplyId {
        supply.leave();
        let id = supply.id();
        self.stock.push(supply);
        id
    }

    /// Units not yet placed with a location or person
    pub fn stock(&self) -> &[Supply] {
        &self.stock
    }

    /// Takes a unit out of the unplaced stock
    pub fn take_stock(&mut self, supply: SupplyId) -> Option<Supply> {
        supply::take_from(&mut self.stock, supply)
    }

    /// Moves a unit from `from` to `to`.
    ///
    /// Water handed to a person is stamped with today's date; water stored
    /// at a location has its date cleared.
    ///
    /// # Errors
    ///
    /// - `IllegalTransfer` if the move is not one of the allowed transitions
    /// - `PersonNotFound` / `LocationNotFound` for an unknown owner
    /// - `SupplyNotFound` if the unit is not held by `from`
    /// - `PlacementRejected` when a personal belonging is sent to a location
    pub fn allocate(
        &mut self,
        supply: SupplyId,
        from: Holder,
        to: Holder,
    ) -> Result<AllocationEvent, ReliefError> {
        if !from.can_transfer_to(&to) {
            return Err(ReliefError::IllegalTransfer { supply, from, to });
        }
        self.ensure_holder(to)?;

        let unit = self
            .held_by(from)?
            .iter()
            .find(|s| s.id() == supply)
            .ok_or(ReliefError::SupplyNotFound { supply, holder: from })?;
        if let Holder::Location(_) = to {
            ensure_locatable(unit)?;
        }

        let date = self.today();
        let unit = self.take_from_holder(from, supply)?;
        self.place(unit, to, Some(date))?;

        info!(supply = %supply, from = %from, to = %to, "Supply allocated");
        Ok(AllocationEvent {
            supply,
            from,
            to,
            date,
        })
    }

    /// Places a unit loaded from storage with its recorded holder.
    ///
    /// Water held by a person keeps its stored allocation date, falling back
    /// to today when none was recorded. An `Unowned` holder puts the unit in the unplaced stock.
    pub fn restore_supply(
        &mut self,
        supply: Supply,
        holder: Holder,
        allocation_date: Option<NaiveDate>,
    ) -> Result<(), ReliefError> {
        self.ensure_holder(holder)?;
        if let Holder::Location(_) = holder {
            ensure_locatable(&supply)?;
        }
        self.place(supply, holder, allocation_date)
    }

    /// Drops every expired water unit a person holds and returns them
    pub fn sweep_expired_water(&mut self, person: PersonId) -> Result<Vec<Supply>, ReliefError> {
        let today = self.today();
        let expired = self.require_person_mut(person)?.remove_expired_water(today);
        if !expired.is_empty() {
            debug!(person = %person, count = expired.len(), "Expired water removed");
        }
        Ok(expired)
    }

    /// Runs the expiry sweep over every registered person
    pub fn sweep_all_expired_water(&mut self) -> Vec<Supply> {
        let today = self.today();
        let expired: Vec<Supply> = self
            .persons
            .values_mut()
            .flat_map(|p| p.remove_expired_water(today))
            .collect();
        if !expired.is_empty() {
            info!(count = expired.len(), "Expired water removed");
        }
        expired
    }

    /// Current holder of a unit, if the registry knows it
    pub fn locate_supply(&self, supply: SupplyId) -> Option<Holder> {
        if self.stock.iter().any(|s| s.id() == supply) {
            return Some(Holder::Unowned);
        }
        if let Some(location) = self.locations.values().find(|l| l.holds(supply)) {
            return Some(Holder::Location(location.id()));
        }
        self.persons
            .values()
            .find(|p| p.holds(supply))
            .map(|p| Holder::Person(p.id()))
    }

    /// Looks a unit up wherever it is held
    pub fn supply(&self, supply: SupplyId) -> Option<&Supply> {
        let holder = self.locate_supply(supply)?;
        self.held_by(holder).ok()?.iter().find(|s| s.id() == supply)
    }

    fn ensure_holder(&self, holder: Holder) -> Result<(), ReliefError> {
        match holder {
            Holder::Unowned => Ok(()),
            Holder::Location(id) => self.require_location(id).map(|_| ()),
            Holder::Person(id) => self.require_person(id).map(|_| ()),
        }
    }

    fn held_by(&self, holder: Holder) -> Result<&[Supply], ReliefError> {
        match holder {
            Holder::Unowned => Ok(&self.stock),
            Holder::Location(id) => Ok(self.require_location(id)?.supplies()),
            Holder::Person(id) => Ok(self.require_person(id)?.supplies()),
        }
    }

    fn take_from_holder(&mut self, holder: Holder, supply: SupplyId) -> Result<Supply, ReliefError> {
        let taken = match holder {
            Holder::Unowned => self.take_stock(supply),
            Holder::Location(id) => self.require_location_mut(id)?.remove_supply(supply),
            Holder::Person(id) => self.require_person_mut(id)?.remove_supply(supply),
        };
        taken.ok_or(ReliefError::SupplyNotFound { supply, holder })
    }

    fn place(
        &mut self,
        supply: Supply,
        holder: Holder,
        stamp: Option<NaiveDate>,
    ) -> Result<(), ReliefError> {
        match holder {
            Holder::Unowned => {
                self.add_stock(supply);
            }
            Holder::Location(id) => self.require_location_mut(id)?.store(supply),
            Holder::Person(id) => {
                let stamp = stamp.unwrap_or_else(|| self.today());
                self.require_person_mut(id)?.hold(supply, stamp);
            }
        }
        Ok(())
    }
}

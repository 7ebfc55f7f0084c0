//! Supply units and their ownership state
//!
//! A [`Supply`] is a move-only value: it lives in exactly one collection at a
//! time (a person's held supplies, a location's store, or the registry's
//! unplaced stock). Its [`Holder`] mirrors the collection it is in.
//!
//! ```text
//!              ┌────────────┐
//!              │  Unowned   │
//!              └─────┬──────┘
//!          ┌─────────┴──────────┐
//!          ▼                    ▼
//!  ┌───────────────┐    ┌──────────────┐
//!  │HeldByLocation │◄──►│ HeldByPerson │
//!  └───────────────┘    └──────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{LocationId, PersonId, SupplyId};

use crate::error::ReliefError;

/// Type token for water
pub const WATER: &str = "water";
/// Type token for cots
pub const COT: &str = "cot";
/// Type token for personal belongings
pub const PERSONAL_BELONGING: &str = "personal belonging";

/// Current owner of a supply unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "holder", content = "id", rename_all = "snake_case")]
pub enum Holder {
    Unowned,
    Location(LocationId),
    Person(PersonId),
}

impl Holder {
    /// Whether a unit held here may move to `to`.
    ///
    /// Unowned units may be placed anywhere; after that a unit only moves
    /// between a location and a person.
    pub fn can_transfer_to(&self, to: &Holder) -> bool {
        matches!(
            (self, to),
            (Holder::Unowned, Holder::Location(_))
                | (Holder::Unowned, Holder::Person(_))
                | (Holder::Location(_), Holder::Person(_))
                | (Holder::Person(_), Holder::Location(_))
        )
    }

    pub fn is_person(&self) -> bool {
        matches!(self, Holder::Person(_))
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Unowned => write!(f, "unplaced stock"),
            Holder::Location(id) => write!(f, "{}", id),
            Holder::Person(id) => write!(f, "{}", id),
        }
    }
}

/// Supply category with its category-specific payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SupplyKind {
    /// Drinking water; the allocation date is only set while a person holds it
    Water { allocation_date: Option<NaiveDate> },
    /// A cot at a room and grid cell
    Cot { room: String, grid: String },
    /// Something a person brought with them; never stored at a location
    PersonalBelonging { description: String },
    /// Any other supply, identified by its type name
    General { type_name: String },
}

impl SupplyKind {
    /// Type token used for display and persistence
    pub fn type_name(&self) -> &str {
        match self {
            SupplyKind::Water { .. } => WATER,
            SupplyKind::Cot { .. } => COT,
            SupplyKind::PersonalBelonging { .. } => PERSONAL_BELONGING,
            SupplyKind::General { type_name } => type_name,
        }
    }

    /// Whether units of this kind may be stored at a location
    pub fn is_locatable(&self) -> bool {
        !matches!(self, SupplyKind::PersonalBelonging { .. })
    }
}

/// A supply unit
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Supply {
    id: SupplyId,
    quantity: u32,
    kind: SupplyKind,
    holder: Holder,
}

impl Supply {
    fn with_kind(kind: SupplyKind, quantity: u32) -> Self {
        Self {
            id: SupplyId::new(),
            quantity,
            kind,
            holder: Holder::Unowned,
        }
    }

    pub fn water(quantity: u32) -> Self {
        Self::with_kind(SupplyKind::Water { allocation_date: None }, quantity)
    }

    /// Creates a cot. The grid cell is a single token; the room may contain spaces.
    pub fn cot(
        room: impl Into<String>,
        grid: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, ReliefError> {
        let grid = checked_grid(grid.into())?;
        Ok(Self::with_kind(
            SupplyKind::Cot {
                room: room.into(),
                grid,
            },
            quantity,
        ))
    }

    pub fn personal_belonging(description: impl Into<String>) -> Self {
        Self::with_kind(
            SupplyKind::PersonalBelonging {
                description: description.into(),
            },
            1,
        )
    }

    /// Creates a supply of any other type. The reserved tokens `water`, `cot`
    /// and `personal belonging` map onto their dedicated kinds.
    pub fn general(type_name: impl Into<String>, quantity: u32) -> Self {
        let type_name = type_name.into();
        match type_name.as_str() {
            WATER => Self::water(quantity),
            COT => Self::with_kind(
                SupplyKind::Cot {
                    room: String::new(),
                    grid: String::new(),
                },
                quantity,
            ),
            PERSONAL_BELONGING => Self::with_kind(
                SupplyKind::PersonalBelonging {
                    description: String::new(),
                },
                quantity,
            ),
            _ => Self::with_kind(SupplyKind::General { type_name }, quantity),
        }
    }

    pub fn id(&self) -> SupplyId {
        self.id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub fn kind(&self) -> &SupplyKind {
        &self.kind
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    pub fn holder(&self) -> Holder {
        self.holder
    }

    pub fn is_locatable(&self) -> bool {
        self.kind.is_locatable()
    }

    pub fn is_water(&self) -> bool {
        matches!(self.kind, SupplyKind::Water { .. })
    }

    /// Date a water unit was handed to its current holder
    pub fn allocation_date(&self) -> Option<NaiveDate> {
        match self.kind {
            SupplyKind::Water { allocation_date } => allocation_date,
            _ => None,
        }
    }

    pub fn room(&self) -> Option<&str> {
        match &self.kind {
            SupplyKind::Cot { room, .. } => Some(room),
            _ => None,
        }
    }

    pub fn grid(&self) -> Option<&str> {
        match &self.kind {
            SupplyKind::Cot { grid, .. } => Some(grid),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.kind {
            SupplyKind::PersonalBelonging { description } => Some(description),
            _ => None,
        }
    }

    /// Moves a cot to another room and grid cell
    pub fn set_cot_position(
        &mut self,
        new_room: impl Into<String>,
        new_grid: impl Into<String>,
    ) -> Result<(), ReliefError> {
        match &mut self.kind {
            SupplyKind::Cot { room, grid } => {
                *grid = checked_grid(new_grid.into())?;
                *room = new_room.into();
                Ok(())
            }
            _ => Err(ReliefError::WrongSupplyKind {
                supply: self.id,
                expected: COT,
            }),
        }
    }

    pub fn set_description(&mut self, text: impl Into<String>) -> Result<(), ReliefError> {
        match &mut self.kind {
            SupplyKind::PersonalBelonging { description } => {
                *description = text.into();
                Ok(())
            }
            _ => Err(ReliefError::WrongSupplyKind {
                supply: self.id,
                expected: PERSONAL_BELONGING,
            }),
        }
    }

    /// Water expires once more than one full day has passed since it was
    /// handed to a person. Water at a location never expires.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match (self.holder, &self.kind) {
            (Holder::Person(_), SupplyKind::Water { allocation_date: Some(date) }) => {
                today.signed_duration_since(*date).num_days() > 1
            }
            _ => false,
        }
    }

    /// Records the new holder and applies the water date rule.
    ///
    /// `stamp` is the allocation date for person holders and `None` otherwise.
    pub(crate) fn enter(&mut self, holder: Holder, stamp: Option<NaiveDate>) {
        self.holder = holder;
        if let SupplyKind::Water { allocation_date } = &mut self.kind {
            *allocation_date = stamp.filter(|_| holder.is_person());
        }
    }

    /// Marks the unit as taken out of its collection
    pub(crate) fn leave(&mut self) {
        self.holder = Holder::Unowned;
    }
}

fn checked_grid(grid: String) -> Result<String, ReliefError> {
    if grid.chars().any(char::is_whitespace) {
        Err(ReliefError::InvalidCotGrid(grid))
    } else {
        Ok(grid)
    }
}

/// Removes the unit with `id` from `items`, keeping the order of the rest
pub(crate) fn take_from(items: &mut Vec<Supply>, id: SupplyId) -> Option<Supply> {
    let index = items.iter().position(|s| s.id == id)?;
    let mut supply = items.remove(index);
    supply.leave();
    Some(supply)
}

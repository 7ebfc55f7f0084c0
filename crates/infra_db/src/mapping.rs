//! Conversions between domain entities and table rows
//!
//! The `supply.comments` column is overloaded: cots store `"<room> <grid>"`,
//! personal belongings store their description, other supplies leave it
//! empty.

use core_kernel::IdentitySequence;
use thiserror::Error;

use domain_relief::{
    Gender, Inquirer, Location, Person, ReliefError, Supply, SupplyKind, COT, PERSONAL_BELONGING,
    WATER,
};

use crate::repositories::{
    InquiryRow, LocationRow, NewInquirer, NewLocation, NewPerson, NewSupply, PersonRow,
    SupplyRow,
};

pub fn new_person(person: &Person) -> NewPerson {
    NewPerson {
        first_name: person.first_name().to_string(),
        last_name: person.last_name().map(str::to_string),
        date_of_birth: person.date_of_birth(),
        gender: person.gender().map(|g| g.as_str().to_string()),
        entry_date: person.entry_date(),
        comments: person.comments().map(str::to_string),
        family_group: person.family_group().map(str::to_string),
    }
}

/// Rebuilds a person from its row, drawing a fresh identifier.
///
/// Every column is validated before the identifier is drawn.
pub fn person_from_row(ids: &IdentitySequence, row: &PersonRow) -> Result<Person, ReliefError> {
    let gender = row
        .gender
        .as_deref()
        .map(str::parse::<Gender>)
        .transpose()?;

    let mut person = Person::from_dates(ids, row.first_name.clone(), row.entry_date, row.date_of_birth)?;
    person.set_last_name(row.last_name.clone());
    if let Some(gender) = gender {
        person.set_gender(gender.as_str())?;
    }
    if let Some(comments) = &row.comments {
        person.set_comments(comments.clone());
    }
    Ok(person)
}

pub fn new_location(location: &Location) -> NewLocation {
    NewLocation {
        name: location.name().to_string(),
        address: location.address().to_string(),
    }
}

pub fn location_from_row(row: &LocationRow) -> Location {
    Location::new(row.name.clone(), row.address.clone())
}

/// Why a supply unit and its row could not be converted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SupplyRowError {
    #[error("negative quantity {0}")]
    NegativeQuantity(i32),

    #[error("quantity {0} exceeds the column range")]
    QuantityOutOfRange(u32),

    #[error("invalid cot position: {0}")]
    InvalidCot(#[source] ReliefError),
}

/// Row form of a supply unit. Quantities must fit the signed column.
pub fn new_supply(supply: &Supply) -> Result<NewSupply, SupplyRowError> {
    let quantity = i32::try_from(supply.quantity())
        .map_err(|_| SupplyRowError::QuantityOutOfRange(supply.quantity()))?;
    let comments = match supply.kind() {
        SupplyKind::Cot { room, grid } => Some(format!("{} {}", room, grid)),
        SupplyKind::PersonalBelonging { description } => Some(description.clone()),
        SupplyKind::Water { .. } | SupplyKind::General { .. } => None,
    };
    Ok(NewSupply {
        supply_type: supply.type_name().to_string(),
        quantity,
        comments,
    })
}

/// Rebuilds an unplaced supply unit from its row.
///
/// Cot grids never contain spaces, so the last space in the comments
/// separates the room from the grid.
pub fn supply_from_row(row: &SupplyRow) -> Result<Supply, SupplyRowError> {
    let quantity =
        u32::try_from(row.quantity).map_err(|_| SupplyRowError::NegativeQuantity(row.quantity))?;
    let comments = row.comments.as_deref().unwrap_or_default();

    let supply = match row.supply_type.as_str() {
        WATER => Supply::water(quantity),
        COT => {
            let (room, grid) = comments.rsplit_once(' ').unwrap_or((comments, ""));
            Supply::cot(room, grid, quantity).map_err(SupplyRowError::InvalidCot)?
        }
        PERSONAL_BELONGING => {
            let mut supply = Supply::personal_belonging(comments);
            supply.set_quantity(quantity);
            supply
        }
        other => Supply::general(other, quantity),
    };
    Ok(supply)
}

pub fn new_inquirer(inquirer: &Inquirer) -> NewInquirer {
    NewInquirer {
        first_name: inquirer.first_name().to_string(),
        last_name: inquirer.last_name().map(str::to_string),
        phone_number: inquirer.phone().to_string(),
        info: Some(inquirer.info().to_string()).filter(|info| !info.is_empty()),
    }
}

/// Rebuilds the inquirer of an inquiry row. Stored inquirers are external.
pub fn inquirer_from_row(row: &InquiryRow) -> Result<Inquirer, ReliefError> {
    Inquirer::new(
        row.inquirer_first_name.clone(),
        row.inquirer_last_name.clone(),
        row.phone_number.clone(),
        row.inquirer_info.clone().unwrap_or_default(),
    )
}

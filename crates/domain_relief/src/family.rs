//! Family groups
//!
//! Membership is exclusive: a person belongs to at most one group. The
//! registry keeps the group's member set and each person's back-reference in
//! step, so groups only expose read access publicly.

use serde::Serialize;
use std::collections::BTreeSet;

use core_kernel::PersonId;

/// An exclusive-membership grouping of persons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyGroup {
    id: String,
    members: BTreeSet<PersonId>,
}

impl FamilyGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            members: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn members(&self) -> &BTreeSet<PersonId> {
        &self.members
    }

    pub fn contains(&self, person: PersonId) -> bool {
        self.members.contains(&person)
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn set_id(&mut self, id: String) {
        self.id = id;
    }

    pub(crate) fn insert(&mut self, person: PersonId) -> bool {
        self.members.insert(person)
    }

    pub(crate) fn remove(&mut self, person: PersonId) -> bool {
        self.members.remove(&person)
    }
}

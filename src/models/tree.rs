//! Det upplösta dokumentet

use serde::{Deserialize, Serialize};

use super::family::Family;
use super::person::Person;

/// Alla personer och familjer för en konvertering
///
/// Tilldelade id:n är index: `persons[i].id == i` och `families[i].id == i`.
/// Ingenting delas mellan konverteringar av olika arkiv.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeData {
    pub persons: Vec<Person>,
    pub families: Vec<Family>,
}

impl TreeData {
    pub fn new() -> Self {
        Self {
            persons: Vec::new(),
            families: Vec::new(),
        }
    }

    /// Hitta person med tilldelat id
    pub fn person(&self, id: i64) -> Option<&Person> {
        usize::try_from(id).ok().and_then(|i| self.persons.get(i))
    }

    /// Hitta familj med tilldelat id
    pub fn family(&self, id: i64) -> Option<&Family> {
        usize::try_from(id).ok().and_then(|i| self.families.get(i))
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }
}

impl Default for TreeData {
    fn default() -> Self {
        Self::new()
    }
}

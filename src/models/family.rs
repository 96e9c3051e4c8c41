//! Familjedata i den upplösta modellen

use serde::{Deserialize, Serialize};

use super::event::Event;

/// En familj: makar, barn och eventuell vigsel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    /// Löpande id i dokumentet (index i `TreeData::families`)
    pub id: i64,
    /// Make (HUSB), tilldelat person-id
    pub husband_id: Option<i64>,
    /// Maka (WIFE), tilldelat person-id
    pub wife_id: Option<i64>,
    /// Barn (CHIL), tilldelade person-id:n i upplösningsordning
    pub children_ids: Vec<i64>,
    pub marriage: Option<Event>,
    pub divorced: bool,
    pub notes: Vec<String>,
}

impl Family {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            husband_id: None,
            wife_id: None,
            children_ids: Vec::new(),
            marriage: None,
            divorced: false,
            notes: Vec::new(),
        }
    }
}

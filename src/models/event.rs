//! Livshändelser: födelse, död, dop, begravning och vigsel

use serde::{Deserialize, Serialize};

use super::date::EventDate;

/// Typ av händelse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Birth,
    Death,
    Baptism,
    Burial,
    Marriage,
    Other,
}

impl EventKind {
    /// GEDCOM-tagg för händelsetypen
    pub fn gedcom_tag(&self) -> &'static str {
        match self {
            Self::Birth => "BIRT",
            Self::Death => "DEAT",
            Self::Baptism => "BAPM",
            Self::Burial => "BURI",
            Self::Marriage => "MARR",
            Self::Other => "EVEN",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Birth => "Födelse",
            Self::Death => "Död",
            Self::Baptism => "Dop",
            Self::Burial => "Begravning",
            Self::Marriage => "Vigsel",
            Self::Other => "Övrig händelse",
        }
    }
}

/// En händelse med valfritt datum, ort och anteckning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub date: Option<EventDate>,
    pub place: Option<String>,
    pub note: Option<String>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            date: None,
            place: None,
            note: None,
        }
    }
}

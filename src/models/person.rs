//! Persondata i den upplösta modellen

use serde::{Deserialize, Serialize};

use super::event::Event;
use super::media::MediaRef;

/// Kön enligt GEDCOM (M/F/U)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// Könskod i nyttolasten: 1=man, 2=kvinna, allt annat okänt
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Male,
            2 => Self::Female,
            _ => Self::Unknown,
        }
    }

    pub fn gedcom_value(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }
}

/// En person med tilldelat dokument-id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    /// Löpande id i dokumentet (index i `TreeData::persons`)
    pub id: i64,
    /// Id från källarkivet
    pub native_id: i64,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub sex: Sex,
    pub birth: Option<Event>,
    pub death: Option<Event>,
    pub baptism: Option<Event>,
    pub burial: Option<Event>,
    pub notes: Vec<String>,
    pub media: Vec<MediaRef>,
    /// Familj där personen är barn (FAMC)
    pub family_child: Option<i64>,
    /// Familjer där personen är make/maka (FAMS), i familje-id-ordning
    pub family_spouse: Vec<i64>,
}

impl Person {
    pub fn new(id: i64, native_id: i64) -> Self {
        Self {
            id,
            native_id,
            given_name: None,
            surname: None,
            sex: Sex::Unknown,
            birth: None,
            death: None,
            baptism: None,
            burial: None,
            notes: Vec::new(),
            media: Vec::new(),
            family_child: None,
            family_spouse: Vec::new(),
        }
    }

    /// Hämta fullständigt namn
    pub fn full_name(&self) -> String {
        match (&self.given_name, &self.surname) {
            (Some(g), Some(s)) => format!("{} {}", g, s),
            (Some(g), None) => g.clone(),
            (None, Some(s)) => s.clone(),
            (None, None) => "Okänd".to_string(),
        }
    }
}

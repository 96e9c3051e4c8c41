//! Mediareferenser
//!
//! Arkivet kan innehålla ansiktsbilder och mediatillägg. Konverteraren
//! registrerar att de finns men exporterar aldrig själva bildinnehållet.

use serde::{Deserialize, Serialize};

/// Referens till en mediafil i arkivet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Filnamn eller arkivsökväg
    pub file_name: String,
}

impl MediaRef {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

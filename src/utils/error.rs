//! Feltyper för konverteringen
//!
//! Varje fel hör till en av fyra kategorier. IO- och ZIP-fel lindas in
//! vid källan med det sammanhang som behövs för att peka ut filen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// Arkivet kan inte öppnas eller saknar sin nyttolast
    #[error("Trasigt arkiv: {0}")]
    ArchiveCorrupt(String),

    /// Nyttolasten följer inte det tabbseparerade schemat
    #[error("Schemafel: {0}")]
    SchemaMismatch(String),

    /// En släktskapsreferens pekar fel. Rapporteras som varning,
    /// konverteringen fortsätter utan referensen.
    #[error("Inkonsekvent relation: {0}")]
    RelationshipInconsistency(String),

    /// Utfilen kunde inte skrivas
    #[error("Skrivfel: {0}")]
    WriteFailure(String),
}

impl ConvertError {
    pub fn archive_corrupt(msg: impl Into<String>) -> Self {
        Self::ArchiveCorrupt(msg.into())
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    pub fn relationship(msg: impl Into<String>) -> Self {
        Self::RelationshipInconsistency(msg.into())
    }

    pub fn write_failure(msg: impl Into<String>) -> Self {
        Self::WriteFailure(msg.into())
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

//! Tjänster för ftz2ged
//!
//! Innehåller konverteringslogiken som binder ihop arkivläsning,
//! relationsupplösning och GEDCOM-skrivning.

pub mod converter;
pub mod resolver;

pub use converter::{BatchResult, ConversionReport, ConvertOptions, Converter};
pub use resolver::{RelationshipResolver, ResolveResult};

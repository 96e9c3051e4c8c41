//! ftz2ged - Konverterare från FTZ-släktträdsarkiv till GEDCOM 5.5.1
//!
//! Läser arkivfiler från mobilappen och skriver standardkompatibla
//! GEDCOM-filer med deterministisk utdata.

pub mod ftz;
pub mod gedcom;
pub mod models;
pub mod services;
pub mod utils;

// Re-exports
pub use models::*;
pub use services::{BatchResult, ConversionReport, ConvertOptions, Converter};
pub use utils::{ConvertError, ConvertResult};

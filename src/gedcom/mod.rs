//! GEDCOM-generering för export av släktdata
//!
//! Skriver GEDCOM 5.5.1-format.

pub mod line;
pub mod writer;

pub use line::{LineWriter, MAX_LINE_LEN};
pub use writer::GedcomWriter;

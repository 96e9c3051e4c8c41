//! Läsning och tolkning av FTZ-arkiv

pub mod archive;
pub mod models;
pub mod parser;

pub use archive::FtzArchive;
pub use models::{AdditionKind, FtzCouple, FtzData, FtzPerson, PayloadVersion};
pub use parser::FtzParser;

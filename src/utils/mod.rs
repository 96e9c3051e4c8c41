//! Gemensamma verktyg

pub mod error;
pub mod file_ops;

pub use error::{ConvertError, ConvertResult};

pub mod date;
pub mod event;
pub mod person;
pub mod family;
pub mod media;
pub mod tree;

pub use date::*;
pub use event::*;
pub use person::*;
pub use family::*;
pub use media::*;
pub use tree::*;

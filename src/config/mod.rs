mod structs;
pub mod types;

pub use structs::*;
pub use types::SystemType;

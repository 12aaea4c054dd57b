//! CLI command implementations

mod config_gen;
mod password;

pub use config_gen::config_generate;
pub use password::{password_clear, password_set, password_show};

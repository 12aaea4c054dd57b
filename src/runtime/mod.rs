//! Application runtime
//!
//! Server startup lives here; CLI commands are in [`crate::cli`].

pub mod server;

pub use server::{build_state, run_server};

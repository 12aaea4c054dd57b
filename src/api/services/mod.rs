pub mod command;
pub mod preflight;
pub mod redirect;

pub use command::CommandService;
pub use preflight::PreflightService;
pub use redirect::RedirectService;

//! kvlinker - a key/value link service
//!
//! A URL shortener / key-value redirect service backed by a flat key/value
//! store, managed through a password-gated JSON command API.
//!
//! # Features
//! - **server**: HTTP server mode, `api` and `runtime` (default)
//! - **cli**: Command-line interface, pulls in `clap` and `colored` (default)
//!
//! # Architecture
//! - `storage`: `KvStore` trait and memory / file / redis backends
//! - `services`: command dispatch, GET resolution, key generation, page templates
//! - `api`: actix-web handlers and middleware
//! - `cli`: password and config management commands
//! - `config`: Configuration management
//! - `runtime`: HTTP server startup
//! - `system`: logging

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
#[cfg(feature = "server")]
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;

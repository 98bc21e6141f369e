//! Library exports for kdk-cli.
//!
//! The binary in `main.rs` is a thin wrapper over these modules, which also
//! lets the integration tests reach the argument parser directly.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;

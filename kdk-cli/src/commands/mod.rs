//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `config`: Read and change settings (`get`, `set`, `list`, `report`)
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod config;
pub mod config_get;
pub mod config_list;
pub mod config_report;
pub mod config_set;

pub use completions::CompletionsCommand;
pub use config::{ConfigAction, ConfigCommand};
pub use config_get::ConfigGetCommand;
pub use config_list::{ConfigListCommand, ListFormat};
pub use config_report::ConfigReportCommand;
pub use config_set::ConfigSetCommand;

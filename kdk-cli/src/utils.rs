//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including locating and loading the configuration document and formatting
//! values for the terminal.

use crate::error::CliError;
use kdk::config::defaults::kdk_schema;
use kdk::{Config, ConfigDocument, Logger};
use serde_yaml::Value;
use std::env;
use std::path::PathBuf;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the configuration document location.
    pub config_path: Option<PathBuf>,

    /// Logger picked from the verbosity flags.
    pub logger: Logger,
}

/// Resolve the configuration document, using `./kdk.yml` if not specified.
pub fn resolve_document(global: &GlobalOptions) -> Result<ConfigDocument, CliError> {
    match &global.config_path {
        Some(path) => Ok(ConfigDocument::new(path)),
        None => Ok(ConfigDocument::in_dir(&env::current_dir()?)),
    }
}

/// Load the document and build the kdk configuration tree over it.
pub fn load_config(global: &GlobalOptions) -> Result<(ConfigDocument, Config), CliError> {
    let document = resolve_document(global)?;
    global
        .logger
        .debug(&format!("Loading {}", document.path().display()));
    let config = document.open(&kdk_schema())?;
    Ok((document, config))
}

/// Format a value for display.
///
/// Scalars are printed bare, composites as YAML.
pub fn format_value(value: &Value) -> Result<String, CliError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        other => {
            let text = serde_yaml::to_string(other).map_err(kdk::Error::from)?;
            Ok(text.trim_end().to_string())
        }
    }
}

/// Parse a value given on the command line.
///
/// The text is read as YAML so `true`, `3000` and `{a: 1}` arrive typed;
/// anything that does not parse is kept as a plain string.
pub fn parse_cli_value(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::String(text.to_string());
    }
    serde_yaml::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

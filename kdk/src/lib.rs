#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # kdk
//!
//! The configuration engine behind the `kdk` local development environment
//! tool.
//!
//! Settings are declared once in a [`config::Schema`], built into a
//! [`Config`] tree over the user's `kdk.yml`, and read or written by dotted
//! path. Each setting knows whether the user set it, so the tool can show
//! either the effective configuration or just the user's changes.
//!
//! ## Core Types
//!
//! - [`Config`]: the configuration tree and its `dig`/`bury`/`dump` operations
//! - [`ConfigDocument`]: loading and saving `kdk.yml`
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use kdk::config::defaults::kdk_schema;
//! use kdk::Config;
//!
//! let mut config = Config::from_yaml(&kdk_schema(), "hostname: gdk.local").unwrap();
//! assert_eq!(config.dig("hostname").unwrap(), "gdk.local");
//! assert_eq!(config.dig("port").unwrap(), 3000);
//!
//! config.bury("sshd.enabled", true).unwrap();
//! let changes = config.dump(true).unwrap();
//! assert_eq!(changes["sshd"]["enabled"], true);
//! ```

pub mod config;
pub mod error;
pub mod logging;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigDocument, Schema, SettingPath};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};

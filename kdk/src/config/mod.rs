//! Typed configuration engine for kdk.
//!
//! Every setting kdk exposes lives in one tree of nodes built from a
//! [`Schema`] and the user's `kdk.yml`:
//!
//! - scalar nodes hold one primitive value (string, integer, port, ...)
//! - map nodes hold a free-form map, deep-merged over their default
//! - array nodes hold a dynamically sized list of nested settings groups
//!
//! Each node resolves once to either the user's value or its default, and
//! remembers whether the user set it. Callers address nodes with dotted
//! paths ("slugs") through [`Config::dig`], [`Config::bury`],
//! [`Config::user_defined`] and [`Config::dump`].
//!
//! # Examples
//!
//! ```
//! use kdk::config::{Config, Length, Schema};
//!
//! let schema = Schema::new()
//!     .integer("retries", |_| Ok(3))
//!     .array("hosts", Length::FromDocument, |_| {
//!         Schema::new().string("name", |s| Ok(format!("host-{}", s.index()?)))
//!     });
//!
//! let config = Config::from_yaml(&schema, "hosts: [{}, {name: x}]").unwrap();
//! assert_eq!(config.dig("retries").unwrap(), 3);
//! assert_eq!(config.dig("hosts.0.name").unwrap(), "host-0");
//! assert_eq!(config.dig("hosts.1.name").unwrap(), "x");
//! assert!(config.user_defined("hosts.1.name").unwrap());
//! assert!(!config.user_defined("hosts.0.name").unwrap());
//! ```
//!
//! # Threading
//!
//! Resolution is lazy and memoized with `OnceCell`, so trees are neither
//! `Send` nor `Sync`. Build and read a tree on one thread; hand other threads
//! plain values taken from [`Config::dump`].

pub mod defaults;
pub mod document;
pub mod node;
pub mod path;
pub mod report;
pub mod schema;
pub mod scope;
pub mod settings;
pub mod tree;
pub mod value;

#[cfg(test)]
mod proptests;

pub use document::{ConfigDocument, CONFIG_ENV, DEFAULT_FILE_NAME};
pub use path::SettingPath;
pub use report::{redact, ConfigReport, UnreadableSetting};
pub use schema::{DefaultFn, ElementFn, Length, LengthFn, Schema};
pub use scope::Scope;
pub use settings::{Settings, INDEX_KEY};
pub use tree::Config;
pub use value::{coerce_map, coerce_scalar, deep_merge, NodeKind};

//! Error types for the kdk library.
//!
//! This module provides the error hierarchy for the configuration engine,
//! using `thiserror` for ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::NodeKind;

/// Result type alias for operations that may fail with a kdk error.
///
/// # Examples
///
/// ```
/// use kdk::{Error, Result};
///
/// fn example_operation() -> Result<u16> {
///     Ok(3000)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the kdk library.
#[derive(Debug, Error)]
pub enum Error {
    /// A raw value could not be coerced to the node's declared kind.
    #[error("value '{value}' for setting {slug} is not a valid {kind}")]
    InvalidValue {
        /// The full path of the setting.
        slug: String,
        /// The offending raw value, rendered for display.
        value: String,
        /// The kind the value was expected to be.
        kind: NodeKind,
    },

    /// A serialized value failed to parse.
    #[error("value for setting {slug} is not a valid {kind}: {message}")]
    Parse {
        /// The full path of the setting.
        slug: String,
        /// The kind the value was expected to be.
        kind: NodeKind,
        /// The underlying parser message.
        message: String,
    },

    /// An array path segment is not a non-negative integer.
    #[error("index on {slug} must be a positive number, got '{segment}'")]
    InvalidIndex {
        /// The full path of the array.
        slug: String,
        /// The segment that failed to parse.
        segment: String,
    },

    /// An array path segment is past the end of the array.
    #[error("{slug} only has {length} entries")]
    IndexOutOfBounds {
        /// The full path of the array.
        slug: String,
        /// The number of entries in the array.
        length: usize,
    },

    /// No setting is declared at the addressed path.
    #[error("setting '{slug}' is undefined")]
    SettingUndefined {
        /// The path that was addressed.
        slug: String,
    },

    /// A default expression reads its own value.
    #[error("default for setting {slug} depends on itself")]
    CyclicDefault {
        /// The full path of the setting.
        slug: String,
    },

    /// The configuration document has an unusable shape.
    #[error("invalid configuration document {}: {message}", path.display())]
    Document {
        /// Path of the document.
        path: PathBuf,
        /// A description of the problem.
        message: String,
    },

    /// The configuration document could not be parsed or serialized.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if error comes from addressing an array entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdk::Error;
    ///
    /// let err = Error::IndexOutOfBounds { slug: "hosts".to_string(), length: 2 };
    /// assert!(err.is_array_access());
    /// ```
    #[must_use]
    pub fn is_array_access(&self) -> bool {
        matches!(
            self,
            Self::InvalidIndex { .. } | Self::IndexOutOfBounds { .. }
        )
    }

    /// Check if error means a value was rejected by its setting.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidValue { .. } | Self::Parse { .. })
    }

    /// Check if error means the addressed setting does not exist.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::SettingUndefined { .. })
    }
}

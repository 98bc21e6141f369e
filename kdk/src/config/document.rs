//! The user's configuration document (`kdk.yml`).
//!
//! The document holds only what the user configured. It is read once when
//! the tree is built; the tree applies every write to its copy of the raw
//! document, and that copy is what gets saved. Defaults never leak into it,
//! and keys no setting declares are kept.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::config::schema::Schema;
use crate::config::tree::Config;
use crate::config::value::NodeKind;
use crate::error::{Error, Result};

/// Default file name of the configuration document.
pub const DEFAULT_FILE_NAME: &str = "kdk.yml";

/// Environment variable overriding the document location.
pub const CONFIG_ENV: &str = "KDK_CONFIG";

/// Location of a configuration document on disk.
///
/// # Examples
///
/// ```no_run
/// use kdk::config::{defaults, ConfigDocument};
///
/// let document = ConfigDocument::new("kdk.yml");
/// let mut config = document.open(&defaults::kdk_schema()).unwrap();
/// config.bury("port", 3443).unwrap();
/// document.save(&config).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    path: PathBuf,
}

impl ConfigDocument {
    /// Creates a handle for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The document in `dir` with the default file name.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_FILE_NAME))
    }

    /// Path of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the document exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Reads the document. A missing or empty file is an empty document.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid YAML, or its top
    /// level is not a map.
    pub fn load(&self) -> Result<Mapping> {
        if !self.path.exists() {
            log::debug!("{} not found, using an empty document", self.path.display());
            return Ok(Mapping::new());
        }
        let contents = fs::read_to_string(&self.path)?;
        parse_mapping(&contents, Some(&self.path))
    }

    /// Loads the document and builds the tree for `schema` over it.
    ///
    /// # Errors
    ///
    /// As for [`ConfigDocument::load`] and [`Config::new`].
    pub fn open(&self, schema: &Schema) -> Result<Config> {
        Config::new(schema, self.load()?)
    }

    /// Writes the document `config` was built from, with its changes, back
    /// to disk. Keys no setting declares are kept.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, config: &Config) -> Result<()> {
        let contents = serde_yaml::to_string(config.document())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)?;
        log::debug!("wrote {}", self.path.display());
        Ok(())
    }
}

/// Parses YAML text into a document map.
pub(crate) fn parse_mapping(text: &str, path: Option<&Path>) -> Result<Mapping> {
    if text.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str(text)? {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(Error::Document {
            path: path.map_or_else(|| PathBuf::from("<string>"), Path::to_path_buf),
            message: "top level must be a mapping".to_string(),
        }),
    }
}

/// Finds the place `path` names in a raw document, creating it if needed.
///
/// `kinds[i]` is the kind of the node named by `path[i]`; children of an
/// array live in a list, everything else in a map. Lists are padded with
/// empty maps up to the addressed index.
pub(crate) fn slot<'d>(
    document: &'d mut Mapping,
    path: &[String],
    kinds: &[NodeKind],
) -> Option<&'d mut Value> {
    let (head, rest) = path.split_first()?;
    let mut current = document
        .entry(Value::String(head.clone()))
        .or_insert(Value::Null);

    for (depth, segment) in rest.iter().enumerate() {
        if kinds.get(depth) == Some(&NodeKind::Array) {
            let index: usize = segment.parse().ok()?;
            if !current.is_sequence() {
                *current = Value::Sequence(Vec::new());
            }
            current = match current {
                Value::Sequence(items) => {
                    if items.len() <= index {
                        items.resize(index + 1, Value::Mapping(Mapping::new()));
                    }
                    &mut items[index]
                }
                _ => return None,
            };
        } else {
            if !current.is_mapping() {
                *current = Value::Mapping(Mapping::new());
            }
            current = match current {
                Value::Mapping(map) => map
                    .entry(Value::String(segment.clone()))
                    .or_insert(Value::Null),
                _ => return None,
            };
        }
    }
    Some(current)
}

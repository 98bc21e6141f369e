//! The configuration tree root and its caller-facing operations.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::config::path::SettingPath;
use crate::config::schema::Schema;
use crate::config::scope::Scope;
use crate::config::document;
use crate::config::settings::Settings;
use crate::config::value::NodeKind;
use crate::error::Result;

/// A configuration tree built from a schema and a user document.
///
/// The tree is built once per process by the entry point and passed by
/// reference to whatever needs settings. Reads memoize; writes go through
/// [`Config::bury`], which needs exclusive access.
///
/// # Examples
///
/// ```
/// use kdk::config::{Config, Schema};
///
/// let schema = Schema::new().integer("retries", |_| Ok(3));
/// let mut config = Config::from_yaml(&schema, "").unwrap();
/// assert_eq!(config.dig("retries").unwrap(), 3);
/// assert!(!config.user_defined("retries").unwrap());
///
/// config.bury("retries", "5").unwrap();
/// assert_eq!(config.dig("retries").unwrap(), 5);
/// assert!(config.user_defined("retries").unwrap());
/// ```
#[derive(Clone)]
pub struct Config {
    root: Settings,
    document: Mapping,
}

impl Config {
    /// Builds the tree for `schema` over the user's `document`.
    ///
    /// # Errors
    ///
    /// Fails when the document nests something other than a map where the
    /// schema declares a group.
    pub fn new(schema: &Schema, document: Mapping) -> Result<Self> {
        let root = Settings::build(String::new(), schema, Some(&document), None)?;
        Ok(Self { root, document })
    }

    /// Builds the tree from YAML text. Empty text is an empty document.
    ///
    /// # Errors
    ///
    /// Fails if the text is not a YAML map or does not fit the schema.
    pub fn from_yaml(schema: &Schema, text: &str) -> Result<Self> {
        let document = document::parse_mapping(text, None)?;
        Self::new(schema, document)
    }

    /// The user's document with every successful [`Config::bury`] applied.
    ///
    /// Keys no setting declares are carried along untouched.
    #[must_use]
    pub fn document(&self) -> &Mapping {
        &self.document
    }

    /// A read-only scope over the root, as default expressions see it.
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        Scope::root(&self.root)
    }

    /// Reads the effective value at `path`.
    ///
    /// Groups and array elements read as maps of their effective values.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SettingUndefined`] for unknown keys, an
    /// array-access error for bad indices, and a validation error when the
    /// value in effect cannot be coerced.
    pub fn dig(&self, path: impl Into<SettingPath>) -> Result<Value> {
        self.scope().dig(path)
    }

    /// Reads the effective value at `path` into any deserializable type.
    ///
    /// # Errors
    ///
    /// As for [`Config::dig`], plus a YAML error if the value does not
    /// deserialize into `T`.
    pub fn get<T: DeserializeOwned>(&self, path: impl Into<SettingPath>) -> Result<T> {
        Ok(serde_yaml::from_value(self.dig(path)?)?)
    }

    /// Writes `value` at `path` as if the user had configured it.
    ///
    /// The value is coerced by the addressed node and recorded as that
    /// node's user value; writing a value equal to the default still marks
    /// the setting user-defined. Returns the coerced value. On error the
    /// tree is left unchanged.
    ///
    /// # Errors
    ///
    /// The same addressing errors as [`Config::dig`], plus validation errors
    /// from coercing `value`.
    pub fn bury(&mut self, path: impl Into<SettingPath>, value: impl Into<Value>) -> Result<Value> {
        let path = path.into();
        let mut staged = self.root.clone();
        let mut document = self.document.clone();
        let stored = {
            let scope = Scope::root(&staged);
            let stored = staged.bury(&scope, path.segments(), value.into())?;
            record(&staged, &mut document, path.segments(), stored.clone())?;
            stored
        };
        staged.invalidate();
        self.root = staged;
        self.document = document;
        log::debug!("set {path} to {stored:?}");
        Ok(stored)
    }

    /// Whether the user configured anything at or under `path`.
    ///
    /// # Errors
    ///
    /// The same addressing errors as [`Config::dig`].
    pub fn user_defined(&self, path: impl Into<SettingPath>) -> Result<bool> {
        let path = path.into();
        let scope = self.scope();
        self.root.user_defined(&scope, path.segments())
    }

    /// Dumps the whole tree as a YAML map.
    ///
    /// With `user_only`, only what the user configured is included; map
    /// settings then dump exactly what the user wrote, unmerged.
    ///
    /// # Errors
    ///
    /// Fails if any included setting cannot be resolved.
    pub fn dump(&self, user_only: bool) -> Result<Value> {
        let scope = self.scope();
        Ok(self
            .root
            .dump(&scope, user_only)?
            .unwrap_or_else(|| Value::Mapping(Mapping::new())))
    }

    /// Slugs of every leaf setting, with arrays expanded to their elements.
    ///
    /// An array whose elements cannot be built is listed by its own slug.
    #[must_use]
    pub fn leaf_slugs(&self) -> Vec<String> {
        let scope = self.scope();
        let mut slugs = Vec::new();
        self.root.leaf_slugs(&scope, &mut slugs);
        slugs
    }
}

/// Mirrors a write that `root` accepted into the raw document.
///
/// Groups and array elements are written key by key so that undeclared keys
/// next to them survive.
fn record(root: &Settings, raw: &mut Mapping, path: &[String], value: Value) -> Result<()> {
    let mut kinds = Vec::new();
    root.shape(&Scope::root(root), path, &mut kinds)?;

    match (kinds.last(), value) {
        (None | Some(NodeKind::Settings), Value::Mapping(entries)) => {
            for (key, entry) in entries {
                if let Some(name) = key.as_str() {
                    record(root, raw, &child_path(path, name), entry)?;
                }
            }
        }
        (None | Some(NodeKind::Settings), _) => {}
        (Some(NodeKind::Array), Value::Sequence(entries)) => {
            let mut element_kinds = kinds.clone();
            element_kinds.push(NodeKind::Settings);
            for (index, entry) in entries.into_iter().enumerate() {
                let element = child_path(path, &index.to_string());
                if let Some(slot) = document::slot(raw, &element, &element_kinds) {
                    if !slot.is_mapping() {
                        *slot = Value::Mapping(Mapping::new());
                    }
                }
                record(root, raw, &element, entry)?;
            }
        }
        (_, value) => {
            if let Some(slot) = document::slot(raw, path, &kinds) {
                *slot = value;
            }
        }
    }
    Ok(())
}

fn child_path(path: &[String], segment: &str) -> Vec<String> {
    let mut child = path.to_vec();
    child.push(segment.to_string());
    child
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config").field("root", &self.root).finish()
    }
}

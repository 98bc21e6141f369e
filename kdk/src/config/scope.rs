//! Read access to the tree for default expressions.

use serde_yaml::Value;

use crate::config::path::{child_slug, SettingPath};
use crate::config::settings::{Settings, INDEX_KEY};
use crate::config::value::{coerce_scalar, NodeKind};
use crate::error::{Error, Result};

/// A view of one settings group and its ancestors.
///
/// Default expressions receive the scope of the group that declares them,
/// so `scope.dig("port")` reads a sibling and `scope.top()` reaches the root.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    settings: &'a Settings,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(settings: &'a Settings) -> Self {
        Self {
            settings,
            parent: None,
        }
    }

    pub(crate) fn child<'b>(&'b self, settings: &'b Settings) -> Scope<'b> {
        Scope {
            settings,
            parent: Some(self),
        }
    }

    /// The slug of the group this scope views; empty at the root.
    #[must_use]
    pub fn slug(&self) -> &str {
        self.settings.slug()
    }

    /// The scope of the enclosing group, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Scope<'a>> {
        self.parent
    }

    /// The scope of the tree root.
    #[must_use]
    pub fn top(&self) -> &Scope<'a> {
        let mut scope = self;
        while let Some(parent) = scope.parent {
            scope = parent;
        }
        scope
    }

    /// Reads the effective value at `path`, relative to this group.
    ///
    /// # Errors
    ///
    /// Propagates any error from resolving the addressed setting.
    pub fn dig(&self, path: impl Into<SettingPath>) -> Result<Value> {
        let path = path.into();
        self.settings.dig(self, path.segments())
    }

    /// Reads a setting as a string.
    ///
    /// # Errors
    ///
    /// Fails if the setting cannot be read or is not string-like.
    pub fn string(&self, path: impl Into<SettingPath>) -> Result<String> {
        let path = path.into();
        match self.typed(path.clone(), NodeKind::String)? {
            Value::String(s) => Ok(s),
            other => Err(self.mismatch(&path.to_string(), &other, NodeKind::String)),
        }
    }

    /// Reads a setting as an integer.
    ///
    /// # Errors
    ///
    /// Fails if the setting cannot be read or is not an integer.
    pub fn integer(&self, path: impl Into<SettingPath>) -> Result<i64> {
        let path = path.into();
        let value = self.typed(path.clone(), NodeKind::Integer)?;
        value
            .as_i64()
            .ok_or_else(|| self.mismatch(&path.to_string(), &value, NodeKind::Integer))
    }

    /// Reads a setting as a floating point number.
    ///
    /// # Errors
    ///
    /// Fails if the setting cannot be read or is not numeric.
    pub fn float(&self, path: impl Into<SettingPath>) -> Result<f64> {
        let path = path.into();
        let value = self.typed(path.clone(), NodeKind::Float)?;
        value
            .as_f64()
            .ok_or_else(|| self.mismatch(&path.to_string(), &value, NodeKind::Float))
    }

    /// Reads a setting as a boolean.
    ///
    /// # Errors
    ///
    /// Fails if the setting cannot be read or is not a boolean.
    pub fn boolean(&self, path: impl Into<SettingPath>) -> Result<bool> {
        let path = path.into();
        let value = self.typed(path.clone(), NodeKind::Bool)?;
        value
            .as_bool()
            .ok_or_else(|| self.mismatch(&path.to_string(), &value, NodeKind::Bool))
    }

    /// Reads a setting as a non-negative count, e.g. for array lengths.
    ///
    /// # Errors
    ///
    /// Fails if the setting is not an integer or is negative.
    pub fn count(&self, path: impl Into<SettingPath>) -> Result<usize> {
        let path = path.into();
        let n = self.integer(path.clone())?;
        usize::try_from(n)
            .map_err(|_| self.mismatch(&path.to_string(), &Value::from(n), NodeKind::Integer))
    }

    /// The index of the nearest enclosing array element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingUndefined`] outside of an array element.
    pub fn index(&self) -> Result<usize> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(index) = current.settings.index() {
                return Ok(index);
            }
            scope = current.parent;
        }
        Err(Error::SettingUndefined {
            slug: child_slug(self.slug(), INDEX_KEY),
        })
    }

    fn typed(&self, path: SettingPath, kind: NodeKind) -> Result<Value> {
        let value = self.dig(&path)?;
        coerce_scalar(kind, &child_slug(self.slug(), &path.to_string()), &value)
    }

    fn mismatch(&self, relative: &str, value: &Value, kind: NodeKind) -> Error {
        crate::config::value::invalid(&child_slug(self.slug(), relative), value, kind)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, Length, Schema};

    fn schema() -> Schema {
        Schema::new()
            .string("hostname", |_| Ok("kdk.test"))
            .port("port", |_| Ok(3000))
            .string("url", |s| {
                Ok(format!("http://{}:{}", s.string("hostname")?, s.integer("port")?))
            })
            .group(
                "rails",
                Schema::new()
                    .string("address", |s| Ok(s.top().string("hostname")?))
                    .integer("workers", |_| Ok("2")),
            )
            .array("shards", Length::Fixed(2), |_| {
                Schema::new().string("name", |s| Ok(format!("shard-{}", s.index()?)))
            })
    }

    #[test]
    fn test_default_reads_siblings() {
        let config = Config::new(&schema(), serde_yaml::Mapping::new()).unwrap();
        assert_eq!(config.scope().string("url").unwrap(), "http://kdk.test:3000");
    }

    #[test]
    fn test_default_reads_ancestors() {
        let doc = serde_yaml::from_str("hostname: gdk.local").unwrap();
        let config = Config::new(&schema(), doc).unwrap();
        assert_eq!(
            config.scope().string("rails.address").unwrap(),
            "gdk.local"
        );
    }

    #[test]
    fn test_typed_getters_coerce() {
        let config = Config::new(&schema(), serde_yaml::Mapping::new()).unwrap();
        let scope = config.scope();
        assert_eq!(scope.integer("rails.workers").unwrap(), 2);
        assert_eq!(scope.count("port").unwrap(), 3000);
        assert!(scope.boolean("hostname").is_err());
    }

    #[test]
    fn test_index_outside_array_is_undefined() {
        let config = Config::new(&schema(), serde_yaml::Mapping::new()).unwrap();
        assert!(config.scope().index().unwrap_err().is_undefined());
        assert_eq!(config.dig("shards.1.name").unwrap(), "shard-1");
    }

    #[test]
    fn test_top_of_root_is_root() {
        let config = Config::new(&schema(), serde_yaml::Mapping::new()).unwrap();
        let scope = config.scope();
        assert!(scope.parent().is_none());
        assert_eq!(scope.top().slug(), "");
    }
}

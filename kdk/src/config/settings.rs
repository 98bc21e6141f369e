//! Groups of settings.
//!
//! A [`Settings`] group is one level of the tree: the root, a nested group
//! such as `rails`, or one element of an array. It routes path operations to
//! the node named by the first segment.

use serde_yaml::{Mapping, Value};

use crate::config::node::{Node, ScalarNode};
use crate::config::path::child_slug;
use crate::config::schema::Schema;
use crate::config::scope::Scope;
use crate::config::value::{invalid, NodeKind};
use crate::error::{Error, Result};

/// Key of the synthetic field holding an array element's index.
pub const INDEX_KEY: &str = "__index";

/// One level of the configuration tree.
#[derive(Clone)]
pub struct Settings {
    slug: String,
    index: Option<usize>,
    fields: Vec<(String, Node)>,
}

impl Settings {
    /// Builds a group from its schema and the user's document at this level.
    ///
    /// Array elements pass their `index`, which is exposed as `__index`.
    pub(crate) fn build(
        slug: String,
        schema: &Schema,
        raw: Option<&Mapping>,
        index: Option<usize>,
    ) -> Result<Self> {
        let mut fields = Vec::new();

        if let Some(index) = index {
            let node = ScalarNode::constant(
                child_slug(&slug, INDEX_KEY),
                NodeKind::Integer,
                Value::from(index),
            );
            fields.push((INDEX_KEY.to_string(), Node::Scalar(node)));
        }

        for (key, declaration) in schema.declarations() {
            let raw_value = raw.and_then(|map| map.get(key)).cloned();
            let node = Node::build(&slug, key, declaration, raw_value)?;
            fields.push((key.to_string(), node));
        }

        Ok(Self {
            slug,
            index,
            fields,
        })
    }

    /// The full path of this group; empty at the root.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// The index of this group within its array, if it is an element.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Declared keys, including `__index` for array elements.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    fn field(&self, key: &str) -> Result<&Node> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
            .ok_or_else(|| Error::SettingUndefined {
                slug: child_slug(&self.slug, key),
            })
    }

    fn visible(&self) -> impl Iterator<Item = &(String, Node)> {
        self.fields.iter().filter(|(key, _)| key != INDEX_KEY)
    }

    pub(crate) fn dig(&self, scope: &Scope<'_>, segments: &[String]) -> Result<Value> {
        match segments.split_first() {
            None => Ok(self
                .dump(scope, false)?
                .unwrap_or_else(|| Value::Mapping(Mapping::new()))),
            Some((head, rest)) => self.field(head)?.dig(scope, rest),
        }
    }

    /// Writes `value` at `segments`. With no segments, `value` must be a map
    /// whose entries are written to the matching children.
    pub(crate) fn bury(&self, scope: &Scope<'_>, segments: &[String], value: Value) -> Result<Value> {
        if let Some((head, rest)) = segments.split_first() {
            return self.field(head)?.bury(scope, rest, value);
        }

        let entries = match value {
            Value::Mapping(entries) => entries,
            Value::Null => Mapping::new(),
            other => return Err(invalid(&self.slug, &other, NodeKind::Settings)),
        };

        let mut stored = Mapping::new();
        for (key, entry) in entries {
            let Some(name) = key.as_str() else {
                return Err(invalid(&self.slug, &key, NodeKind::String));
            };
            let value = self.field(name)?.bury(scope, &[], entry)?;
            stored.insert(key, value);
        }
        Ok(Value::Mapping(stored))
    }

    pub(crate) fn shape(
        &self,
        scope: &Scope<'_>,
        segments: &[String],
        out: &mut Vec<NodeKind>,
    ) -> Result<()> {
        match segments.split_first() {
            None => Ok(()),
            Some((head, rest)) => self.field(head)?.shape(scope, rest, out),
        }
    }

    pub(crate) fn user_defined(&self, scope: &Scope<'_>, segments: &[String]) -> Result<bool> {
        match segments.split_first() {
            None => Ok(self.any_user_defined()),
            Some((head, rest)) => self.field(head)?.user_defined(scope, rest),
        }
    }

    pub(crate) fn any_user_defined(&self) -> bool {
        self.visible().any(|(_, node)| node.any_user_defined())
    }

    /// Dumps this group as a map. With `user_only`, children nobody
    /// configured are left out, and an untouched group dumps as `None`.
    pub(crate) fn dump(&self, scope: &Scope<'_>, user_only: bool) -> Result<Option<Value>> {
        let mut map = Mapping::new();
        for (key, node) in self.visible() {
            if let Some(value) = node.dump(scope, user_only)? {
                map.insert(Value::String(key.clone()), value);
            }
        }

        if user_only && map.is_empty() {
            return Ok(None);
        }
        Ok(Some(Value::Mapping(map)))
    }

    pub(crate) fn leaf_slugs(&self, scope: &Scope<'_>, out: &mut Vec<String>) {
        for (_, node) in self.visible() {
            node.leaf_slugs(scope, out);
        }
    }

    pub(crate) fn invalidate(&mut self) {
        for (_, node) in &mut self.fields {
            node.invalidate();
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("slug", &self.slug)
            .field("index", &self.index)
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

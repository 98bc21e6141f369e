//! Schema declarations for configuration trees.
//!
//! A [`Schema`] lists, in order, the keys of one level of the tree and what
//! to build for each: a scalar, a map, a nested group, or an array of nested
//! groups. Defaults are closures evaluated lazily against a [`Scope`] for the
//! enclosing group, so a default may read its siblings and ancestors.
//!
//! # Examples
//!
//! ```
//! use kdk::config::{Length, Schema};
//!
//! let schema = Schema::new()
//!     .integer("retries", |_| Ok(3))
//!     .array("hosts", Length::FromDocument, |_| {
//!         Schema::new().string("name", |s| Ok(format!("host-{}", s.index()?)))
//!     });
//! assert_eq!(schema.keys().collect::<Vec<_>>(), ["retries", "hosts"]);
//! ```

use std::fmt;
use std::rc::Rc;

use serde_yaml::Value;

use crate::config::scope::Scope;
use crate::config::value::NodeKind;
use crate::error::Result;

/// A default expression, evaluated in the scope of the enclosing group.
pub type DefaultFn = Rc<dyn Fn(&Scope<'_>) -> Result<Value>>;

/// A computed array length, evaluated in the scope of the enclosing group.
pub type LengthFn = Rc<dyn Fn(&Scope<'_>) -> Result<usize>>;

/// Builds the schema of one array element from its index.
pub type ElementFn = Rc<dyn Fn(usize) -> Schema>;

/// How an array decides how many elements it has.
///
/// The length is computed once and never changes afterwards.
#[derive(Clone)]
pub enum Length {
    /// Always this many elements.
    Fixed(usize),
    /// Derived from other settings.
    Computed(LengthFn),
    /// As many elements as the user document lists.
    FromDocument,
}

impl Length {
    /// Wraps a closure as a computed length.
    pub fn computed<F>(length: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<usize> + 'static,
    {
        Self::Computed(Rc::new(length))
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => f.debug_tuple("Fixed").field(n).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
            Self::FromDocument => f.write_str("FromDocument"),
        }
    }
}

/// What one key of a schema declares.
#[derive(Clone)]
pub(crate) enum Declaration {
    Scalar { kind: NodeKind, default: DefaultFn },
    Map { default: DefaultFn },
    Group(Schema),
    Array { length: Length, element: ElementFn },
}

impl Declaration {
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar { kind, .. } => *kind,
            Self::Map { .. } => NodeKind::Map,
            Self::Group(_) => NodeKind::Settings,
            Self::Array { .. } => NodeKind::Array,
        }
    }
}

/// An ordered set of setting declarations for one level of the tree.
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(String, Declaration)>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a string setting.
    #[must_use]
    pub fn string<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.scalar(key, NodeKind::String, default)
    }

    /// Declares an integer setting.
    #[must_use]
    pub fn integer<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.scalar(key, NodeKind::Integer, default)
    }

    /// Declares a floating point setting.
    #[must_use]
    pub fn float<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.scalar(key, NodeKind::Float, default)
    }

    /// Declares a boolean setting.
    #[must_use]
    pub fn boolean<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.scalar(key, NodeKind::Bool, default)
    }

    /// Declares a port setting.
    #[must_use]
    pub fn port<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.scalar(key, NodeKind::Port, default)
    }

    /// Declares a path setting.
    #[must_use]
    pub fn path<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.scalar(key, NodeKind::Path, default)
    }

    /// Declares a scalar setting of any scalar kind.
    #[must_use]
    pub fn scalar<F, V>(self, key: &str, kind: NodeKind, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        debug_assert!(kind.is_scalar(), "{kind} is not a scalar kind");
        self.declare(
            key,
            Declaration::Scalar {
                kind,
                default: wrap(default),
            },
        )
    }

    /// Declares a free-form map setting. The user's map is deep-merged over
    /// the default.
    #[must_use]
    pub fn map<F, V>(self, key: &str, default: F) -> Self
    where
        F: Fn(&Scope<'_>) -> Result<V> + 'static,
        V: Into<Value>,
    {
        self.declare(
            key,
            Declaration::Map {
                default: wrap(default),
            },
        )
    }

    /// Declares a nested group of settings.
    #[must_use]
    pub fn group(self, key: &str, schema: Schema) -> Self {
        self.declare(key, Declaration::Group(schema))
    }

    /// Declares an array whose elements are nested groups built by `element`.
    #[must_use]
    pub fn array<F>(self, key: &str, length: Length, element: F) -> Self
    where
        F: Fn(usize) -> Schema + 'static,
    {
        self.declare(
            key,
            Declaration::Array {
                length,
                element: Rc::new(element),
            },
        )
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn declarations(&self) -> impl Iterator<Item = (&str, &Declaration)> {
        self.fields.iter().map(|(key, decl)| (key.as_str(), decl))
    }

    // Redeclaring a key replaces it in place.
    fn declare(mut self, key: &str, declaration: Declaration) -> Self {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = declaration,
            None => self.fields.push((key.to_string(), declaration)),
        }
        self
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.declarations().map(|(key, decl)| (key, decl.kind())))
            .finish()
    }
}

fn wrap<F, V>(default: F) -> DefaultFn
where
    F: Fn(&Scope<'_>) -> Result<V> + 'static,
    V: Into<Value>,
{
    Rc::new(move |scope: &Scope<'_>| -> Result<Value> { default(scope).map(Into::into) })
}

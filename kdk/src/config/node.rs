//! Configuration nodes.
//!
//! Every declared key becomes one [`Node`]. A node keeps the raw value the
//! user wrote (if any) separately from the value in effect, which is resolved
//! on first read and memoized. Nodes are single-threaded: memoization uses
//! `OnceCell`, so a tree is neither `Send` nor `Sync`.

use std::cell::{Cell, OnceCell, RefCell};

use serde_yaml::{Mapping, Value};

use crate::config::path::child_slug;
use crate::config::schema::{Declaration, DefaultFn, ElementFn, Length};
use crate::config::scope::Scope;
use crate::config::settings::Settings;
use crate::config::value::{coerce_map, coerce_scalar, deep_merge, invalid, NodeKind};
use crate::error::{Error, Result};

/// A lazily computed value with cycle detection.
#[derive(Clone)]
pub(crate) struct Memo<T> {
    value: OnceCell<T>,
    resolving: Cell<bool>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            value: OnceCell::new(),
            resolving: Cell::new(false),
        }
    }
}

impl<T> Memo<T> {
    pub(crate) fn get(&self) -> Option<&T> {
        self.value.get()
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        self.value.get_mut()
    }

    pub(crate) fn get_or_try_init<F>(&self, slug: &str, init: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        if self.resolving.replace(true) {
            return Err(Error::CyclicDefault {
                slug: slug.to_string(),
            });
        }
        let result = init();
        self.resolving.set(false);
        let value = result?;
        Ok(self.value.get_or_init(|| value))
    }

    pub(crate) fn reset(&mut self) {
        self.value.take();
    }
}

/// One node of the configuration tree.
#[derive(Clone)]
pub(crate) enum Node {
    Scalar(ScalarNode),
    Map(MapNode),
    Array(ArrayNode),
    Group(Settings),
}

impl Node {
    /// Builds the node declared for `key` from its raw document value.
    pub(crate) fn build(
        parent_slug: &str,
        key: &str,
        declaration: &Declaration,
        raw: Option<Value>,
    ) -> Result<Self> {
        let slug = child_slug(parent_slug, key);
        Ok(match declaration {
            Declaration::Scalar { kind, default } => {
                Self::Scalar(ScalarNode::new(slug, *kind, default.clone(), raw))
            }
            Declaration::Map { default } => Self::Map(MapNode::new(slug, default.clone(), raw)),
            Declaration::Array { length, element } => Self::Array(ArrayNode::new(
                slug,
                length.clone(),
                element.clone(),
                raw,
            )),
            Declaration::Group(schema) => {
                let raw = match raw {
                    None | Some(Value::Null) => None,
                    Some(Value::Mapping(map)) => Some(map),
                    Some(other) => return Err(invalid(&slug, &other, NodeKind::Settings)),
                };
                Self::Group(Settings::build(slug, schema, raw.as_ref(), None)?)
            }
        })
    }

    /// Reads the effective value at `rest`, below this node.
    ///
    /// `scope` is the scope of the group holding this node.
    pub(crate) fn dig(&self, scope: &Scope<'_>, rest: &[String]) -> Result<Value> {
        match self {
            Self::Scalar(node) => node.dig(scope, rest),
            Self::Map(node) => node.dig(scope, rest),
            Self::Array(node) => node.dig(scope, rest),
            Self::Group(settings) => settings.dig(&scope.child(settings), rest),
        }
    }

    pub(crate) fn bury(&self, scope: &Scope<'_>, rest: &[String], value: Value) -> Result<Value> {
        match self {
            Self::Scalar(node) => node.bury(rest, value),
            Self::Map(node) => node.bury(rest, value),
            Self::Array(node) => node.bury(scope, rest, value),
            Self::Group(settings) => settings.bury(&scope.child(settings), rest, value),
        }
    }

    pub(crate) fn user_defined(&self, scope: &Scope<'_>, rest: &[String]) -> Result<bool> {
        match self {
            Self::Scalar(node) => node.user_defined(rest),
            Self::Map(node) => node.user_defined(rest),
            Self::Array(node) => node.user_defined(scope, rest),
            Self::Group(settings) => settings.user_defined(&scope.child(settings), rest),
        }
    }

    /// Pushes the kind of every node `rest` passes through, this one first.
    ///
    /// Keys inside a map setting report as maps.
    pub(crate) fn shape(
        &self,
        scope: &Scope<'_>,
        rest: &[String],
        out: &mut Vec<NodeKind>,
    ) -> Result<()> {
        match self {
            Self::Scalar(node) => {
                if !rest.is_empty() {
                    return Err(undefined(&node.slug, rest));
                }
                out.push(node.kind);
                Ok(())
            }
            Self::Map(_) => {
                out.resize(out.len() + rest.len() + 1, NodeKind::Map);
                Ok(())
            }
            Self::Array(node) => {
                out.push(NodeKind::Array);
                let Some((head, rest)) = rest.split_first() else {
                    return Ok(());
                };
                let element = node.select(scope, head)?;
                out.push(NodeKind::Settings);
                element.shape(&scope.child(element), rest, out)
            }
            Self::Group(settings) => {
                out.push(NodeKind::Settings);
                settings.shape(&scope.child(settings), rest, out)
            }
        }
    }

    /// Returns `None` when `user_only` is set and nothing here was configured.
    pub(crate) fn dump(&self, scope: &Scope<'_>, user_only: bool) -> Result<Option<Value>> {
        match self {
            Self::Scalar(node) => node.dump(scope, user_only),
            Self::Map(node) => node.dump(scope, user_only),
            Self::Array(node) => node.dump(scope, user_only),
            Self::Group(settings) => settings.dump(&scope.child(settings), user_only),
        }
    }

    /// Whether anything at or below this node came from the user.
    pub(crate) fn any_user_defined(&self) -> bool {
        match self {
            Self::Scalar(node) => node.raw.borrow().is_some(),
            Self::Map(node) => node.raw.borrow().is_some(),
            Self::Array(node) => node.any_user_defined(),
            Self::Group(settings) => settings.any_user_defined(),
        }
    }

    pub(crate) fn leaf_slugs(&self, scope: &Scope<'_>, out: &mut Vec<String>) {
        match self {
            Self::Scalar(node) => out.push(node.slug.clone()),
            Self::Map(node) => out.push(node.slug.clone()),
            Self::Array(node) => match node.elements(scope) {
                Ok(elements) if !elements.is_empty() => {
                    for element in elements {
                        element.leaf_slugs(&scope.child(element), out);
                    }
                }
                _ => out.push(node.slug.clone()),
            },
            Self::Group(settings) => settings.leaf_slugs(&scope.child(settings), out),
        }
    }

    /// Drops memoized effective values so they are re-resolved on next read.
    pub(crate) fn invalidate(&mut self) {
        match self {
            Self::Scalar(node) => node.resolved.reset(),
            Self::Map(node) => node.resolved.reset(),
            Self::Array(node) => {
                if let Some(elements) = node.elements.get_mut() {
                    elements.iter_mut().for_each(Settings::invalidate);
                }
            }
            Self::Group(settings) => settings.invalidate(),
        }
    }
}

fn undefined(slug: &str, rest: &[String]) -> Error {
    Error::SettingUndefined {
        slug: child_slug(slug, &rest.join(".")),
    }
}

/// A single primitive value.
#[derive(Clone)]
pub(crate) struct ScalarNode {
    slug: String,
    kind: NodeKind,
    default: DefaultFn,
    raw: RefCell<Option<Value>>,
    resolved: Memo<Value>,
}

impl ScalarNode {
    fn new(slug: String, kind: NodeKind, default: DefaultFn, raw: Option<Value>) -> Self {
        Self {
            slug,
            kind,
            default,
            raw: RefCell::new(raw),
            resolved: Memo::default(),
        }
    }

    /// A scalar whose default is a constant; used for the element index.
    pub(crate) fn constant(slug: String, kind: NodeKind, value: Value) -> Self {
        let default: DefaultFn =
            std::rc::Rc::new(move |_: &Scope<'_>| -> Result<Value> { Ok(value.clone()) });
        Self::new(slug, kind, default, None)
    }

    fn resolve(&self, scope: &Scope<'_>) -> Result<&Value> {
        self.resolved.get_or_try_init(&self.slug, || {
            let raw = self.raw.borrow().clone();
            match raw {
                Some(raw) => coerce_scalar(self.kind, &self.slug, &raw),
                None => coerce_scalar(self.kind, &self.slug, &(self.default)(scope)?),
            }
        })
    }

    fn dig(&self, scope: &Scope<'_>, rest: &[String]) -> Result<Value> {
        if !rest.is_empty() {
            return Err(undefined(&self.slug, rest));
        }
        self.resolve(scope).cloned()
    }

    fn bury(&self, rest: &[String], value: Value) -> Result<Value> {
        if !rest.is_empty() {
            return Err(undefined(&self.slug, rest));
        }
        let coerced = coerce_scalar(self.kind, &self.slug, &value)?;
        *self.raw.borrow_mut() = Some(coerced.clone());
        Ok(coerced)
    }

    fn user_defined(&self, rest: &[String]) -> Result<bool> {
        if !rest.is_empty() {
            return Err(undefined(&self.slug, rest));
        }
        Ok(self.raw.borrow().is_some())
    }

    fn dump(&self, scope: &Scope<'_>, user_only: bool) -> Result<Option<Value>> {
        if user_only && self.raw.borrow().is_none() {
            return Ok(None);
        }
        self.resolve(scope).map(|value| Some(value.clone()))
    }
}

/// A free-form map, deep-merged over its default.
#[derive(Clone)]
pub(crate) struct MapNode {
    slug: String,
    default: DefaultFn,
    raw: RefCell<Option<Value>>,
    resolved: Memo<Value>,
}

impl MapNode {
    fn new(slug: String, default: DefaultFn, raw: Option<Value>) -> Self {
        Self {
            slug,
            default,
            raw: RefCell::new(raw),
            resolved: Memo::default(),
        }
    }

    fn user_map(&self) -> Result<Option<Mapping>> {
        self.raw
            .borrow()
            .as_ref()
            .map(|raw| coerce_map(&self.slug, raw))
            .transpose()
    }

    fn resolve(&self, scope: &Scope<'_>) -> Result<&Value> {
        self.resolved.get_or_try_init(&self.slug, || {
            let default = coerce_map(&self.slug, &(self.default)(scope)?)?;
            let effective = match self.user_map()? {
                Some(user) => deep_merge(&default, &user),
                None => default,
            };
            Ok(Value::Mapping(effective))
        })
    }

    fn dig(&self, scope: &Scope<'_>, rest: &[String]) -> Result<Value> {
        let mut current = self.resolve(scope)?;
        for (depth, segment) in rest.iter().enumerate() {
            current = lookup(current, segment)
                .ok_or_else(|| undefined(&self.slug, &rest[..=depth]))?;
        }
        Ok(current.clone())
    }

    // Writes go to the user map only; the default is merged in on read.
    fn bury(&self, rest: &[String], value: Value) -> Result<Value> {
        let Some((last, parents)) = rest.split_last() else {
            let map = coerce_map(&self.slug, &value)?;
            *self.raw.borrow_mut() = Some(Value::Mapping(map.clone()));
            return Ok(Value::Mapping(map));
        };

        let mut user = self.user_map()?.unwrap_or_default();
        let mut target = &mut user;
        for segment in parents {
            let key = Value::String(segment.clone());
            if !matches!(target.get(&key), Some(Value::Mapping(_))) {
                target.insert(key.clone(), Value::Mapping(Mapping::new()));
            }
            target = match target.get_mut(&key) {
                Some(Value::Mapping(inner)) => inner,
                _ => return Err(undefined(&self.slug, rest)),
            };
        }
        target.insert(Value::String(last.clone()), value.clone());
        *self.raw.borrow_mut() = Some(Value::Mapping(user));
        Ok(value)
    }

    fn user_defined(&self, rest: &[String]) -> Result<bool> {
        let Some(user) = self.user_map()? else {
            return Ok(false);
        };
        let mut current = &Value::Mapping(user);
        for segment in rest {
            match lookup(current, segment) {
                Some(next) => current = next,
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    // A user-only dump is exactly what the user wrote, without the default.
    fn dump(&self, scope: &Scope<'_>, user_only: bool) -> Result<Option<Value>> {
        if user_only {
            return Ok(self.user_map()?.map(Value::Mapping));
        }
        self.resolve(scope).map(|value| Some(value.clone()))
    }
}

fn lookup<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Mapping(map) => map.get(segment),
        Value::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// An ordered list of nested settings groups.
#[derive(Clone)]
pub(crate) struct ArrayNode {
    slug: String,
    length: Length,
    element: ElementFn,
    raw: RefCell<Option<Value>>,
    len: Memo<usize>,
    elements: Memo<Vec<Settings>>,
}

impl ArrayNode {
    fn new(slug: String, length: Length, element: ElementFn, raw: Option<Value>) -> Self {
        Self {
            slug,
            length,
            element,
            raw: RefCell::new(raw),
            len: Memo::default(),
            elements: Memo::default(),
        }
    }

    fn raw_entries(&self) -> Result<Vec<Value>> {
        match self.raw.borrow().as_ref() {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Sequence(entries)) => Ok(entries.clone()),
            Some(other) => Err(invalid(&self.slug, other, NodeKind::Array)),
        }
    }

    /// The number of elements, fixed on first computation.
    pub(crate) fn length(&self, scope: &Scope<'_>) -> Result<usize> {
        self.len
            .get_or_try_init(&self.slug, || {
                let length = match &self.length {
                    Length::Fixed(n) => *n,
                    Length::Computed(length) => length(scope)?,
                    Length::FromDocument => {
                        let count = self.raw_entries()?.len();
                        if count == 0 && self.raw.borrow().is_none() {
                            *self.raw.borrow_mut() = Some(Value::Sequence(Vec::new()));
                        }
                        count
                    }
                };
                log::debug!("{} has {length} entries ({:?})", self.slug, self.length);
                Ok(length)
            })
            .copied()
    }

    pub(crate) fn elements(&self, scope: &Scope<'_>) -> Result<&[Settings]> {
        let elements = self.elements.get_or_try_init(&self.slug, || {
            let length = self.length(scope)?;
            let entries = self.raw_entries()?;
            (0..length)
                .map(|index| {
                    let slug = child_slug(&self.slug, &index.to_string());
                    let raw = match entries.get(index) {
                        None | Some(Value::Null) => None,
                        Some(Value::Mapping(map)) => Some(map),
                        Some(other) => return Err(invalid(&slug, other, NodeKind::Settings)),
                    };
                    log::debug!("building {slug}");
                    Settings::build(slug, &(self.element)(index), raw, Some(index))
                })
                .collect::<Result<Vec<_>>>()
        })?;
        Ok(elements.as_slice())
    }

    fn select<'s>(&'s self, scope: &Scope<'_>, segment: &str) -> Result<&'s Settings> {
        let invalid_index = || Error::InvalidIndex {
            slug: self.slug.clone(),
            segment: segment.to_string(),
        };
        // Plain base-10 digits only, so every element has exactly one slug.
        let canonical = !segment.is_empty()
            && segment.bytes().all(|b| b.is_ascii_digit())
            && (segment == "0" || !segment.starts_with('0'));
        if !canonical {
            return Err(invalid_index());
        }
        let index: usize = segment.parse().map_err(|_| invalid_index())?;
        let elements = self.elements(scope)?;
        elements.get(index).ok_or_else(|| Error::IndexOutOfBounds {
            slug: self.slug.clone(),
            length: elements.len(),
        })
    }

    fn dig(&self, scope: &Scope<'_>, rest: &[String]) -> Result<Value> {
        let Some((head, rest)) = rest.split_first() else {
            return self
                .dump_elements(scope, false, usize::MAX)
                .map(Value::Sequence);
        };
        let element = self.select(scope, head)?;
        element.dig(&scope.child(element), rest)
    }

    fn bury(&self, scope: &Scope<'_>, rest: &[String], value: Value) -> Result<Value> {
        if let Some((head, rest)) = rest.split_first() {
            let element = self.select(scope, head)?;
            return element.bury(&scope.child(element), rest, value);
        }

        let entries = match value {
            Value::Sequence(entries) => entries,
            other => return Err(invalid(&self.slug, &other, NodeKind::Array)),
        };
        let elements = self.elements(scope)?;
        if entries.len() > elements.len() {
            return Err(Error::IndexOutOfBounds {
                slug: self.slug.clone(),
                length: elements.len(),
            });
        }
        let stored = elements
            .iter()
            .zip(entries)
            .map(|(element, entry)| element.bury(&scope.child(element), &[], entry))
            .collect::<Result<Vec<_>>>()?;

        // Entries past the written ones keep counting towards the length.
        let mut raw = self.raw_entries()?;
        let known = raw.len();
        for (slot, value) in raw.iter_mut().zip(&stored) {
            *slot = value.clone();
        }
        raw.extend(stored.iter().skip(known).cloned());
        *self.raw.borrow_mut() = Some(Value::Sequence(raw));
        Ok(Value::Sequence(stored))
    }

    fn any_user_defined(&self) -> bool {
        self.raw.borrow().is_some()
            || self
                .elements
                .get()
                .is_some_and(|elements| elements.iter().any(Settings::any_user_defined))
    }

    fn user_defined(&self, scope: &Scope<'_>, rest: &[String]) -> Result<bool> {
        let Some((head, rest)) = rest.split_first() else {
            return Ok(self.any_user_defined());
        };
        let element = self.select(scope, head)?;
        element.user_defined(&scope.child(element), rest)
    }

    fn dump(&self, scope: &Scope<'_>, user_only: bool) -> Result<Option<Value>> {
        if !user_only {
            return self
                .dump_elements(scope, false, usize::MAX)
                .map(|items| Some(Value::Sequence(items)));
        }
        // Measuring the length may initialize the user list.
        let elements = self.elements(scope)?;
        if !self.any_user_defined() {
            return Ok(None);
        }
        let configured = elements
            .iter()
            .rposition(Settings::any_user_defined)
            .map_or(0, |last| last + 1);
        let raw = self.raw_entries()?;
        let count = configured.max(raw.len());
        let mut dumped = self.dump_elements(scope, true, count)?;
        // Entries past the length are still the user's; keep them verbatim.
        dumped.extend(raw.into_iter().skip(elements.len()));
        Ok(Some(Value::Sequence(dumped)))
    }

    fn dump_elements(&self, scope: &Scope<'_>, user_only: bool, count: usize) -> Result<Vec<Value>> {
        self.elements(scope)?
            .iter()
            .take(count)
            .map(|element| {
                let dumped = element.dump(&scope.child(element), user_only)?;
                Ok(dumped.unwrap_or_else(|| Value::Mapping(Mapping::new())))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo_resolves_once() {
        let memo: Memo<u32> = Memo::default();
        let calls = Cell::new(0);
        let init = || {
            calls.set(calls.get() + 1);
            Ok(7)
        };
        assert_eq!(*memo.get_or_try_init("n", init).unwrap(), 7);
        assert_eq!(*memo.get_or_try_init("n", init).unwrap(), 7);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_memo_failure_is_not_cached() {
        let memo: Memo<u32> = Memo::default();
        let err = memo.get_or_try_init("n", || {
            Err(Error::SettingUndefined {
                slug: "n".to_string(),
            })
        });
        assert!(err.is_err());
        assert_eq!(*memo.get_or_try_init("n", || Ok(1)).unwrap(), 1);
    }

    #[test]
    fn test_memo_detects_reentry() {
        let memo: Memo<u32> = Memo::default();
        let result = memo.get_or_try_init("loop", || {
            memo.get_or_try_init("loop", || Ok(1)).copied()
        });
        assert!(matches!(result, Err(Error::CyclicDefault { slug }) if slug == "loop"));
    }

    #[test]
    fn test_memo_reset() {
        let mut memo: Memo<u32> = Memo::default();
        memo.get_or_try_init("n", || Ok(1)).unwrap();
        memo.reset();
        assert!(memo.get().is_none());
    }

    #[test]
    fn test_lookup_into_maps_and_lists() {
        let value: Value = serde_yaml::from_str("{a: {b: [x, y]}}").unwrap();
        let b = lookup(&value, "a").and_then(|a| lookup(a, "b")).unwrap();
        assert_eq!(lookup(b, "1"), Some(&Value::from("y")));
        assert_eq!(lookup(b, "2"), None);
        assert_eq!(lookup(&value, "missing"), None);
    }
}

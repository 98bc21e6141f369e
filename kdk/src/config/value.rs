//! Value kinds, coercion and map merging.
//!
//! Raw values come straight out of the YAML document (or the command line)
//! and are converted here to the kind a node declares. Coercion never invents
//! a value: a `null` scalar is rejected, and defaults are the schema's job.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// The kind of a configuration node, used for coercion and in error messages.
///
/// # Examples
///
/// ```
/// use kdk::config::NodeKind;
///
/// assert_eq!(NodeKind::Port.to_string(), "port");
/// assert!(NodeKind::Bool.is_scalar());
/// assert!(!NodeKind::Map.is_scalar());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A string.
    String,
    /// A signed 64-bit integer.
    Integer,
    /// A floating point number.
    Float,
    /// A boolean.
    Bool,
    /// A TCP port (1-65535).
    Port,
    /// A filesystem path, kept verbatim.
    Path,
    /// A free-form map.
    Map,
    /// A list of nested settings.
    Array,
    /// A group of nested settings.
    Settings,
}

impl NodeKind {
    /// The name used in error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Port => "port",
            Self::Path => "path",
            Self::Map => "map",
            Self::Array => "array",
            Self::Settings => "settings",
        }
    }

    /// Returns `true` for kinds holding a single primitive value.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::Map | Self::Array | Self::Settings)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Renders a raw value for an error message.
pub(crate) fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| format!("{other:?}")),
    }
}

pub(crate) fn invalid(slug: &str, raw: &Value, kind: NodeKind) -> Error {
    Error::InvalidValue {
        slug: slug.to_string(),
        value: describe(raw),
        kind,
    }
}

/// Converts a raw value to a scalar `kind`.
///
/// # Errors
///
/// Returns [`Error::InvalidValue`] naming `slug`, the raw value and the kind
/// when the value is absent (`null`) or has an incompatible shape.
///
/// # Examples
///
/// ```
/// use kdk::config::{coerce_scalar, NodeKind};
/// use serde_yaml::Value;
///
/// let port = coerce_scalar(NodeKind::Integer, "port", &Value::from("3000")).unwrap();
/// assert_eq!(port, Value::from(3000));
/// assert!(coerce_scalar(NodeKind::String, "hostname", &Value::Null).is_err());
/// ```
pub fn coerce_scalar(kind: NodeKind, slug: &str, raw: &Value) -> Result<Value> {
    if let Value::Tagged(tagged) = raw {
        return coerce_scalar(kind, slug, &tagged.value);
    }

    let coerced = match kind {
        NodeKind::String | NodeKind::Path => to_string(raw).map(Value::String),
        NodeKind::Integer => to_integer(raw).map(Value::from),
        NodeKind::Float => to_float(raw).map(Value::from),
        NodeKind::Bool => to_bool(raw).map(Value::Bool),
        NodeKind::Port => to_integer(raw)
            .filter(|port| (1..=i64::from(u16::MAX)).contains(port))
            .map(Value::from),
        NodeKind::Map | NodeKind::Array | NodeKind::Settings => None,
    };

    coerced.ok_or_else(|| invalid(slug, raw, kind))
}

fn to_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn to_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .filter(|f| (i64::MIN as f64..=i64::MAX as f64).contains(f))
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Converts a raw value to a map.
///
/// Strings are parsed as JSON objects, `null` is the empty map and a list
/// of `[key, value]` pairs is collected into a map.
///
/// # Errors
///
/// Returns [`Error::Parse`] when a string is not valid JSON, keeping the
/// parser's message, and [`Error::InvalidValue`] for any other shape.
///
/// # Examples
///
/// ```
/// use kdk::config::coerce_map;
/// use serde_yaml::Value;
///
/// let env = coerce_map("env", &Value::from(r#"{"RAILS_ENV": "development"}"#)).unwrap();
/// assert_eq!(env.get("RAILS_ENV"), Some(&Value::from("development")));
/// assert!(coerce_map("env", &Value::from("{nope")).is_err());
/// ```
pub fn coerce_map(slug: &str, raw: &Value) -> Result<Mapping> {
    match raw {
        Value::Mapping(map) => Ok(map.clone()),
        Value::Null => Ok(Mapping::new()),
        Value::Tagged(tagged) => coerce_map(slug, &tagged.value),
        Value::String(s) => parse_json_map(slug, s, raw),
        Value::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Value::Sequence(pair) if pair.len() == 2 => Ok((pair[0].clone(), pair[1].clone())),
                _ => Err(invalid(slug, raw, NodeKind::Map)),
            })
            .collect(),
        Value::Bool(_) | Value::Number(_) => Err(invalid(slug, raw, NodeKind::Map)),
    }
}

fn parse_json_map(slug: &str, text: &str, raw: &Value) -> Result<Mapping> {
    let parse_error = |message: String| Error::Parse {
        slug: slug.to_string(),
        kind: NodeKind::Map,
        message,
    };

    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| parse_error(e.to_string()))?;
    if !json.is_object() {
        return Err(invalid(slug, raw, NodeKind::Map));
    }

    match serde_yaml::to_value(json).map_err(|e| parse_error(e.to_string()))? {
        Value::Mapping(map) => Ok(map),
        _ => Err(invalid(slug, raw, NodeKind::Map)),
    }
}

/// Deep-merges `overlay` over `base`.
///
/// Keys present in both are merged recursively while both sides are maps;
/// at the first non-map level the overlay wins. Keys only in `base` survive.
///
/// # Examples
///
/// ```
/// use kdk::config::deep_merge;
/// use serde_yaml::Mapping;
///
/// let base: Mapping = serde_yaml::from_str("a: {x: 1, y: 2}").unwrap();
/// let overlay: Mapping = serde_yaml::from_str("a: {y: 3}").unwrap();
/// let merged = deep_merge(&base, &overlay);
/// assert_eq!(merged, serde_yaml::from_str::<Mapping>("a: {x: 1, y: 3}").unwrap());
/// ```
#[must_use]
pub fn deep_merge(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let combined = match (merged.get(key), value) {
            (Some(Value::Mapping(below)), Value::Mapping(above)) => {
                Value::Mapping(deep_merge(below, above))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

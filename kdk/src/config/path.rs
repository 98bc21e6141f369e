//! Setting paths ("slugs").
//!
//! A path addresses one node in the configuration tree. It is written either
//! as a single dotted string (`cells.instances.0.port`) or as separate
//! segments. Array entries are addressed by base-10 indices.

use std::fmt;

/// A path to a setting, split into segments.
///
/// # Examples
///
/// ```
/// use kdk::config::SettingPath;
///
/// let dotted = SettingPath::from("hosts.1.name");
/// let segments = SettingPath::from(["hosts", "1", "name"]);
/// assert_eq!(dotted, segments);
/// assert_eq!(dotted.to_string(), "hosts.1.name");
/// assert!(SettingPath::from("").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SettingPath {
    segments: Vec<String>,
}

impl SettingPath {
    /// Splits a dotted path. The empty string is the empty path.
    #[must_use]
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::default();
        }
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    /// The path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` for the path addressing the tree root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }
}

impl fmt::Display for SettingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for SettingPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

impl From<String> for SettingPath {
    fn from(dotted: String) -> Self {
        Self::parse(&dotted)
    }
}

impl From<&String> for SettingPath {
    fn from(dotted: &String) -> Self {
        Self::parse(dotted)
    }
}

impl From<&SettingPath> for SettingPath {
    fn from(path: &SettingPath) -> Self {
        path.clone()
    }
}

impl From<Vec<String>> for SettingPath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for SettingPath {
    fn from(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for SettingPath {
    fn from(segments: [&str; N]) -> Self {
        Self::from(&segments[..])
    }
}

/// Joins a parent slug and a key; the root has an empty slug.
pub(crate) fn child_slug(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

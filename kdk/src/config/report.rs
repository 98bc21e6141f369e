//! Redacted configuration reports for bug reports.
//!
//! A report lists what the user customized, with secrets masked, and which
//! settings could not be read. It never fails because of one bad setting.

use serde::Serialize;
use serde_yaml::Value;

use crate::config::tree::Config;

/// Replacement text for redacted values.
pub const REDACTED: &str = "[REDACTED]";

const SECRET_MARKERS: [&str; 3] = ["password", "secret", "token"];

/// A setting that failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableSetting {
    /// The setting's slug.
    pub slug: String,
    /// Why it could not be read.
    pub error: String,
}

/// What the user changed, safe to paste into an issue.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    /// The user-only dump with secrets redacted; `null` if it failed.
    pub customized: Value,
    /// Settings that could not be read.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unreadable: Vec<UnreadableSetting>,
}

impl ConfigReport {
    /// Builds a report for `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kdk::config::{Config, ConfigReport, Schema};
    ///
    /// let schema = Schema::new()
    ///     .string("api_token", |_| Ok(""))
    ///     .port("port", |_| Ok(3000));
    /// let config = Config::from_yaml(&schema, "api_token: abc\nport: 0").unwrap();
    /// let report = ConfigReport::build(&config);
    /// assert_eq!(report.unreadable.len(), 1);
    /// assert_eq!(report.unreadable[0].slug, "port");
    /// ```
    #[must_use]
    pub fn build(config: &Config) -> Self {
        let mut unreadable: Vec<UnreadableSetting> = config
            .leaf_slugs()
            .into_iter()
            .filter_map(|slug| {
                config.dig(slug.as_str()).err().map(|err| UnreadableSetting {
                    slug,
                    error: err.to_string(),
                })
            })
            .collect();

        let customized = match config.dump(true) {
            Ok(dumped) => redact(dumped),
            Err(err) => {
                log::debug!("user-only dump failed: {err}");
                if unreadable.is_empty() {
                    unreadable.push(UnreadableSetting {
                        slug: String::new(),
                        error: err.to_string(),
                    });
                }
                Value::Null
            }
        };

        Self {
            customized,
            unreadable,
        }
    }
}

/// Masks values under keys that look like secrets.
#[must_use]
pub fn redact(value: Value) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.into_iter()
                .map(|(key, value)| {
                    let value = if key.as_str().is_some_and(is_secret) {
                        Value::from(REDACTED)
                    } else {
                        redact(value)
                    };
                    (key, value)
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(redact).collect()),
        other => other,
    }
}

fn is_secret(key: &str) -> bool {
    let key = key.to_lowercase();
    SECRET_MARKERS.iter().any(|marker| key.contains(marker))
}

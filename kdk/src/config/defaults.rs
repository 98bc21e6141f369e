//! The settings kdk itself exposes.
//!
//! Every setting a user can read with `kdk config get` or change with
//! `kdk config set` is declared here, together with its default.

use serde_yaml::{Mapping, Value};

use crate::config::schema::{Length, Schema};

/// Builds the schema for `kdk.yml`.
///
/// # Examples
///
/// ```
/// use kdk::config::{defaults::kdk_schema, Config};
///
/// let config = Config::from_yaml(&kdk_schema(), "cells: {instance_count: 2}").unwrap();
/// assert_eq!(config.dig("cells.instances.1.name").unwrap(), "kdk-cell-2");
/// assert_eq!(config.dig("cells.instances.1.port").unwrap(), 3000 + 12000 * 2);
/// ```
#[must_use]
pub fn kdk_schema() -> Schema {
    Schema::new()
        .string("hostname", |_| Ok("kdk.test"))
        .string("listen_address", |_| Ok("127.0.0.1"))
        .port("port", |_| Ok(3000))
        .integer("retries", |_| Ok(3))
        .group(
            "https",
            Schema::new().boolean("enabled", |_| Ok(false)),
        )
        .group(
            "kdk",
            Schema::new()
                .boolean("debug", |_| Ok(false))
                .boolean("overwrite_changes", |_| Ok(false))
                .boolean("ask_to_restart_after_update", |_| Ok(true))
                .boolean("auto_reconfigure", |_| Ok(true)),
        )
        .map("env", |_| Ok(Value::Mapping(Mapping::new())))
        .group("rails", rails())
        .group("postgresql", postgresql())
        .group(
            "redis",
            Schema::new()
                .boolean("enabled", |_| Ok(true))
                .port("port", |_| Ok(6379)),
        )
        .group(
            "sshd",
            Schema::new()
                .boolean("enabled", |_| Ok(false))
                .port("listen_port", |_| Ok(2222)),
        )
        .array("services", Length::FromDocument, |_| service())
        .group("cells", cells())
}

fn rails() -> Schema {
    Schema::new()
        .string("address", |s| s.top().string("listen_address"))
        .port("port", |_| Ok(8080))
        .integer("threads", |_| Ok(1))
        .integer("workers", |s| Ok(if s.top().boolean("kdk.debug")? { 0 } else { 2 }))
        .string("url", |s| {
            let scheme = if s.top().boolean("https.enabled")? {
                "https"
            } else {
                "http"
            };
            Ok(format!(
                "{scheme}://{}:{}",
                s.top().string("hostname")?,
                s.top().integer("port")?
            ))
        })
}

fn postgresql() -> Schema {
    Schema::new()
        .string("host", |s| s.top().string("listen_address"))
        .port("port", |_| Ok(5432))
        .path("dir", |_| Ok("postgresql"))
        .integer("max_connections", |_| Ok(100))
}

fn service() -> Schema {
    Schema::new()
        .string("name", |s| Ok(format!("service-{}", s.index()?)))
        .boolean("enabled", |_| Ok(true))
        .string("command", |s| Ok(format!("support/exec-{}", s.string("name")?)))
}

fn cells() -> Schema {
    Schema::new()
        .boolean("enabled", |s| Ok(s.integer("instance_count")? > 0))
        .integer("instance_count", |_| Ok(0))
        .integer("port_offset", |_| Ok(12000))
        .array(
            "instances",
            Length::computed(|s| s.count("instance_count")),
            cell,
        )
}

#[allow(clippy::cast_possible_wrap)]
fn cell(index: usize) -> Schema {
    let ordinal = index as i64 + 1;
    Schema::new()
        .string("name", move |_| Ok(format!("kdk-cell-{ordinal}")))
        .port("port", move |s| {
            Ok(s.top().integer("port")? + s.top().integer("cells.port_offset")? * ordinal)
        })
        .map("config", |_| Ok(Value::Mapping(Mapping::new())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn config(text: &str) -> Config {
        Config::from_yaml(&kdk_schema(), text).unwrap()
    }

    #[test]
    fn test_every_default_resolves() {
        let config = config("");
        let dumped = config.dump(false).unwrap();
        assert_eq!(dumped["hostname"], "kdk.test");
        assert_eq!(dumped["rails"]["url"], "http://kdk.test:3000");
        assert_eq!(dumped["cells"]["enabled"], false);
        assert_eq!(dumped["services"], Value::Sequence(Vec::new()));
    }

    #[test]
    fn test_rails_follows_root_settings() {
        let config = config("hostname: gdk.local\nhttps: {enabled: true}\nkdk: {debug: true}");
        assert_eq!(config.dig("rails.url").unwrap(), "https://gdk.local:3000");
        assert_eq!(config.dig("rails.workers").unwrap(), 0);
    }

    #[test]
    fn test_cells_count_follows_instance_count() {
        let config = config("cells: {instance_count: 2, instances: [{config: {a: 1}}]}");
        assert_eq!(config.dig("cells.enabled").unwrap(), true);
        assert_eq!(config.dig("cells.instances.0.port").unwrap(), 15000);
        assert_eq!(config.dig("cells.instances.0.config.a").unwrap(), 1);
        assert!(config.dig("cells.instances.2").unwrap_err().is_array_access());
    }

    #[test]
    fn test_negative_instance_count_is_rejected() {
        let config = config("cells: {instance_count: -1}");
        assert!(config.dig("cells.instances").unwrap_err().is_validation());
    }

    #[test]
    fn test_services_come_from_document() {
        let config = config("services: [{name: sidekiq}, {enabled: false}]");
        assert_eq!(config.dig("services.0.command").unwrap(), "support/exec-sidekiq");
        assert_eq!(config.dig("services.1.name").unwrap(), "service-1");
        assert_eq!(config.dig("services.1.enabled").unwrap(), false);
    }
}

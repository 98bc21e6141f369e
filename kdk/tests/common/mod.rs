//! Common test utilities for integration tests.
//!
//! This module provides schema fixtures and helpers for building
//! configuration trees from YAML snippets.

use kdk::config::{Config, Length, Schema};
use serde_yaml::Value;

/// The `retries`/`hosts` schema used throughout the scenario tests.
///
/// - `retries`: integer, default 3
/// - `hosts`: array sized by the document, each with `name` defaulting to
///   `host-<index>` and `port` defaulting to `8000 + index`
#[allow(dead_code)]
pub fn hosts_schema() -> Schema {
    Schema::new()
        .integer("retries", |_| Ok(3))
        .array("hosts", Length::FromDocument, |_| {
            Schema::new()
                .string("name", |s| Ok(format!("host-{}", s.index()?)))
                .port("port", |s| Ok(8000 + s.integer("__index")?))
        })
}

/// A schema with one array of each length strategy.
#[allow(dead_code)]
pub fn length_schema() -> Schema {
    Schema::new()
        .integer("replicas", |_| Ok(2))
        .array("fixed", Length::Fixed(3), |i| {
            Schema::new().integer("slot", move |_| Ok(i))
        })
        .array("computed", Length::computed(|s| s.count("replicas")), |i| {
            Schema::new().string("role", move |_| {
                Ok(if i == 0 { "primary" } else { "replica" })
            })
        })
        .array("listed", Length::FromDocument, |_| {
            Schema::new().boolean("enabled", |_| Ok(true))
        })
}

/// Builds a tree from a YAML snippet, panicking on failure.
#[allow(dead_code)]
pub fn build(schema: &Schema, yaml: &str) -> Config {
    Config::from_yaml(schema, yaml).expect("Failed to build configuration tree")
}

/// Parses a YAML snippet into a value.
#[allow(dead_code)]
pub fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).expect("Invalid YAML in test")
}

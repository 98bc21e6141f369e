//! Property-based tests for the configuration engine.

use super::value::{coerce_scalar, deep_merge, NodeKind};
use super::{Config, Length, Schema};
use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

fn schema() -> Schema {
    Schema::new()
        .string("name", |_| Ok("default"))
        .integer("count", |_| Ok(3))
        .port("port", |_| Ok(3000))
        .map("env", |_| Ok(Value::Mapping(Mapping::new())))
        .array("slots", Length::Fixed(4), |i| {
            Schema::new().integer("weight", move |_| Ok(i * 10))
        })
}

// Strategy for small nested maps with string keys
fn mapping_strategy() -> impl Strategy<Value = Mapping> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];
    let tree = leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-c]", inner, 0..4).prop_map(|entries| {
            Value::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (Value::from(k), v))
                    .collect::<Mapping>(),
            )
        })
    });
    prop::collection::btree_map("[a-c]", tree, 0..4).prop_map(|entries| {
        entries
            .into_iter()
            .map(|(k, v)| (Value::from(k), v))
            .collect::<Mapping>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    // Writing then reading a scalar yields the coerced value
    #[test]
    fn bury_then_dig_integer(n in any::<i64>()) {
        let mut config = Config::new(&schema(), Mapping::new()).unwrap();
        config.bury("count", n.to_string()).unwrap();
        let expected = coerce_scalar(NodeKind::Integer, "count", &Value::from(n)).unwrap();
        prop_assert_eq!(config.dig("count").unwrap(), expected);
    }

    #[test]
    fn bury_then_dig_string(s in "[ -~]{0,24}") {
        let mut config = Config::new(&schema(), Mapping::new()).unwrap();
        config.bury("name", s.as_str()).unwrap();
        prop_assert_eq!(config.dig("name").unwrap(), Value::from(s));
        prop_assert!(config.user_defined("name").unwrap());
    }

    #[test]
    fn port_accepts_exactly_valid_range(n in -10i64..70_000) {
        let result = coerce_scalar(NodeKind::Port, "port", &Value::from(n));
        prop_assert_eq!(result.is_ok(), (1..=65535).contains(&n));
    }

    // Every overlay key wins and every base-only key survives
    #[test]
    fn deep_merge_overlay_wins(base in mapping_strategy(), overlay in mapping_strategy()) {
        let merged = deep_merge(&base, &overlay);
        for (key, value) in &overlay {
            match (base.get(key), value) {
                (Some(Value::Mapping(_)), Value::Mapping(_)) => {
                    prop_assert!(matches!(merged.get(key), Some(Value::Mapping(_))));
                }
                _ => {
                    prop_assert_eq!(merged.get(key), Some(value));
                }
            }
        }
        for (key, value) in &base {
            if !overlay.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
    }

    #[test]
    fn deep_merge_with_empty_is_identity(base in mapping_strategy()) {
        prop_assert_eq!(deep_merge(&base, &Mapping::new()), base.clone());
        prop_assert_eq!(deep_merge(&Mapping::new(), &base), base);
    }

    // A user-only dump of a map is exactly what the user wrote
    #[test]
    fn map_user_only_dump_is_unmerged(user in mapping_strategy()) {
        let mut document = Mapping::new();
        document.insert(Value::from("env"), Value::Mapping(user.clone()));
        let config = Config::new(&schema(), document).unwrap();
        let dumped = config.dump(true).unwrap();
        prop_assert_eq!(dumped.get("env"), Some(&Value::Mapping(user)));
    }

    #[test]
    fn dump_is_idempotent(index in 0usize..4, weight in any::<i64>()) {
        let mut config = Config::new(&schema(), Mapping::new()).unwrap();
        config.bury(format!("slots.{index}.weight"), weight).unwrap();
        prop_assert_eq!(config.dump(false).unwrap(), config.dump(false).unwrap());
        prop_assert_eq!(config.dump(true).unwrap(), config.dump(true).unwrap());
    }

    #[test]
    fn out_of_range_index_is_rejected(index in 4usize..1000) {
        let config = Config::new(&schema(), Mapping::new()).unwrap();
        let err = config.dig(format!("slots.{index}.weight")).unwrap_err();
        prop_assert!(err.is_array_access());
    }
}

//! Integration tests for `kdk config`.

mod common;

use common::TestEnv;
use predicates::prelude::*;

// ============================================================================
// config get
// ============================================================================

#[test]
fn test_get_default_without_document() {
    let env = TestEnv::new();
    assert_eq!(env.get("hostname"), "kdk.test");
    assert_eq!(env.get("port"), "3000");
    assert_eq!(env.get("https.enabled"), "false");
    assert!(!env.document_path().exists());
}

#[test]
fn test_get_follows_document() {
    let env = TestEnv::with_document("hostname: gdk.local\nhttps:\n  enabled: true\n");
    assert_eq!(env.get("rails.url"), "https://gdk.local:3000");
}

#[test]
fn test_get_composite_prints_yaml() {
    let env = TestEnv::with_document("cells:\n  instance_count: 1\n");
    let output = env.get("cells.instances.0");
    assert!(output.contains("name: kdk-cell-1"));
    assert!(output.contains("port: 15000"));
}

#[test]
fn test_get_undefined_setting() {
    let env = TestEnv::new();
    env.command()
        .args(["config", "get", "rails.nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("setting 'rails.nope' is undefined"));
}

#[test]
fn test_get_index_out_of_bounds() {
    let env = TestEnv::with_document("services:\n  - name: sidekiq\n");
    assert_eq!(env.get("services.0.command"), "support/exec-sidekiq");
    env.command()
        .args(["config", "get", "services.1.name"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("services only has 1 entries"));
}

#[test]
fn test_get_invalid_document() {
    let env = TestEnv::with_document("- not\n- a map\n");
    env.command()
        .args(["config", "get", "port"])
        .assert()
        .failure()
        .code(7)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_get_with_config_env() {
    let env = TestEnv::new();
    let other = env.path().join("other.yml");
    std::fs::write(&other, "port: 4000\n").unwrap();

    env.command()
        .env("KDK_CONFIG", &other)
        .args(["config", "get", "port"])
        .assert()
        .success()
        .stdout("4000\n");
}

// ============================================================================
// config set
// ============================================================================

#[test]
fn test_set_saves_only_user_values() {
    let env = TestEnv::new();
    env.command()
        .args(["config", "set", "port", "3443"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "'port' is now set to '3443' (previously '3000').",
        ));

    let document = env.document();
    assert_eq!(document["port"], 3443);
    assert!(document.get("hostname").is_none());
    assert_eq!(env.get("rails.url"), "http://kdk.test:3443");
}

#[test]
fn test_set_unchanged_value() {
    let env = TestEnv::with_document("port: 3443\n");
    env.command()
        .args(["config", "set", "port", "3443"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("'port' is already set to '3443'"));
}

#[test]
fn test_set_repairs_invalid_stored_value() {
    let env = TestEnv::with_document("port: 99999\n");
    env.command()
        .args(["config", "set", "port", "3000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "'port' is now set to '3000' (previously unreadable).",
        ))
        .stderr(predicate::str::contains("not a valid port"));
    assert_eq!(env.document()["port"], 3000);
}

#[test]
fn test_set_default_value_is_saved() {
    let env = TestEnv::new();
    env.command()
        .args(["config", "set", "port", "3000"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "'port' is now set to '3000' (previously '3000').",
        ));
    assert_eq!(env.document()["port"], 3000);

    env.command()
        .args(["config", "set", "port", "3000"])
        .assert()
        .success()
        .stderr(predicate::str::contains("'port' is already set to '3000'"));
}

#[test]
fn test_set_requires_slug() {
    let env = TestEnv::new();
    env.command()
        .args(["config", "set", "", "3000"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("Invalid arguments"));
    assert!(!env.document_path().exists());
}

#[test]
fn test_set_keeps_undeclared_keys() {
    let env = TestEnv::with_document("gitlab_pages:\n  enabled: true\n");
    env.set("hostname", "gdk.local");
    let document = env.document();
    assert_eq!(document["gitlab_pages"]["enabled"], true);
    assert_eq!(document["hostname"], "gdk.local");
}

#[test]
fn test_set_rejects_invalid_value() {
    let env = TestEnv::with_document("port: 3443\n");
    env.command()
        .args(["config", "set", "port", "70000"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "value '70000' for setting port is not a valid port",
        ));
    assert_eq!(env.document()["port"], 3443);
}

#[test]
fn test_set_map_key_and_array_element() {
    let env = TestEnv::with_document("services:\n  - {}\n  - {}\n");
    env.set("env.RAILS_ENV", "test");
    env.set("services.1.enabled", "false");

    let document = env.document();
    assert_eq!(document["env"]["RAILS_ENV"], "test");
    assert_eq!(document["services"][1]["enabled"], false);
    assert_eq!(document["services"].as_sequence().unwrap().len(), 2);
    assert_eq!(env.get("services.0.enabled"), "true");
}

#[test]
fn test_set_with_explicit_config_path() {
    let env = TestEnv::new();
    let nested = env.path().join("etc").join("kdk.yml");
    env.command()
        .arg("--config")
        .arg(&nested)
        .args(["config", "set", "sshd.enabled", "yes"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&nested).unwrap();
    assert!(written.contains("enabled: true"));
    assert!(!env.document_path().exists());
}

// ============================================================================
// config list / report
// ============================================================================

#[test]
fn test_list_user_only_yaml() {
    let env = TestEnv::with_document("hostname: gdk.local\n");
    env.command()
        .args(["config", "list", "--user-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hostname: gdk.local"))
        .stdout(predicate::str::contains("listen_address").not());
}

#[test]
fn test_list_json() {
    let env = TestEnv::new();
    let output = env
        .command()
        .args(["config", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["rails"]["port"], 8080);
    assert_eq!(parsed["redis"]["port"], 6379);
}

#[test]
fn test_report_redacts_secrets() {
    let env = TestEnv::with_document("env:\n  DB_PASSWORD: hunter2\n  RAILS_ENV: development\n");
    env.command()
        .args(["config", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DB_PASSWORD: '[REDACTED]'"))
        .stdout(predicate::str::contains("RAILS_ENV: development"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_report_lists_unreadable_settings() {
    let env = TestEnv::with_document("port: not-a-port\n");
    env.command()
        .args(["config", "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# cannot read setting port"));
}

//! Common test utilities for CLI integration tests.
//!
//! This module provides shared helpers for CLI testing, including:
//! - Test environment setup with a temporary working directory
//! - Command builder helpers for common patterns
//! - Access to the `kdk.yml` the commands read and write

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Commands run inside the temporary directory, so they read and write
/// `kdk.yml` there unless a test passes `--config`.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment with no `kdk.yml`.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();

        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Create a test environment whose `kdk.yml` holds `contents`.
    pub fn with_document(contents: &str) -> Self {
        let env = Self::new();
        std::fs::write(env.document_path(), contents).expect("Failed to write kdk.yml");
        env
    }

    /// Get a command builder running in the test directory.
    ///
    /// Inherited `KDK_CONFIG` and `KDK_LOG_MODE` are cleared so the
    /// developer's own environment cannot leak into the test.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("kdk").expect("Failed to find kdk binary");
        cmd.current_dir(&self.temp_path)
            .env_remove("KDK_CONFIG")
            .env_remove("KDK_LOG_MODE");
        cmd
    }

    /// Get the temp path.
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Path of the default document.
    pub fn document_path(&self) -> PathBuf {
        self.temp_path.join("kdk.yml")
    }

    /// Read the document back, parsed.
    ///
    /// # Panics
    /// Panics if the document is missing or not valid YAML.
    pub fn document(&self) -> serde_yaml::Value {
        let text = std::fs::read_to_string(self.document_path()).expect("kdk.yml not written");
        serde_yaml::from_str(&text).expect("kdk.yml is not valid YAML")
    }

    /// Run `kdk config get` and return its trimmed stdout.
    ///
    /// # Panics
    /// Panics if the command fails.
    pub fn get(&self, slug: &str) -> String {
        let output = self
            .command()
            .args(["config", "get", slug])
            .output()
            .expect("Failed to run config get");

        assert!(
            output.status.success(),
            "config get failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        String::from_utf8(output.stdout)
            .expect("Invalid UTF-8 in output")
            .trim_end()
            .to_string()
    }

    /// Run `kdk config set` and assert it succeeded.
    pub fn set(&self, slug: &str, value: &str) {
        self.command()
            .args(["config", "set", slug, value])
            .assert()
            .success();
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

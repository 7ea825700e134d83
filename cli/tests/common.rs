//! # Dunder CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every test runs
//! the compiled `dunder` binary inside a temporary directory with an explicit
//! `--config` file, so the developer's own user or project configuration
//! never leaks into a run.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

/// An `assert_cmd::Command` for the `dunder` binary built for this test run.
pub fn dunder_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dunder").expect("Failed to find dunder binary for testing");
    cmd.env_remove("DUNDER_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// `dunder_cmd()` running in `dir` with `config` as its only configuration.
pub fn dunder_in(dir: &Path, config: &Path) -> Command {
    let mut cmd = dunder_cmd();
    cmd.current_dir(dir).arg("--config").arg(config);
    cmd
}

/// Writes `content` to `<dir>/.dunder.toml` and returns its path.
pub fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(".dunder.toml");
    fs::write(&path, content).expect("Failed to write test config");
    path
}

/// Creates `path` (and its parents) with `content`.
pub fn create_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write test file");
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e))
}

/// The `templates/` directory shipped with the repository.
pub fn bundled_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../templates")
}

/// Escapes a path for use inside a TOML basic string.
pub fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

//! Test support utilities for kubecrypt integration tests.
//!
//! Provides an in-memory KMS, manifest fixtures, and an isolated
//! environment for running the binary.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;
pub mod kms;
pub mod skip;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use kms::RecordingKms;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own working dir and home dir. No process-global
/// state is mutated; child processes use `.current_dir()`.
pub struct Test {
    /// Working directory for the command
    pub dir: TempDir,
    /// Temporary home directory (keeps user config out of the way)
    pub home: TempDir,
}

impl Test {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        Self { dir, home }
    }

    /// Path of `name` inside the working dir.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file into the working dir.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    /// Read a file from the working dir.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("failed to read file")
    }
}

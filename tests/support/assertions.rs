//! Test assertion helpers.

use std::process::Output;

use kubecrypt::core::manifest::Manifest;

/// Assert that a command output was successful.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("Command failed:\n{}", stderr);
    }
}

/// Assert that a command output failed.
pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "Expected command to fail but it succeeded"
    );
}

/// Get stdout as String.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Get stderr as String.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Assert stderr contains a string.
pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr missing '{}', got: {}",
        expected,
        err
    );
}

/// Assert every secret value in `text` is sealed with a data key.
pub fn assert_all_sealed(text: &str) {
    let manifest = Manifest::parse(text).expect("output should parse");
    for obj in manifest.secrets() {
        assert_eq!(obj.kind(), "EncryptedSecret", "{}", obj.display_name());
        for (key, value) in obj.data().unwrap() {
            assert!(value.starts_with("crypto "), "{} not sealed: {}", key, value);
        }
    }
}

/// Lines that differ between two texts of equal line count.
pub fn changed_lines<'a>(before: &'a str, after: &'a str) -> Vec<(&'a str, &'a str)> {
    assert_eq!(
        before.lines().count(),
        after.lines().count(),
        "line count changed:\n{}\n---\n{}",
        before,
        after
    );
    before
        .lines()
        .zip(after.lines())
        .filter(|(a, b)| a != b)
        .collect()
}

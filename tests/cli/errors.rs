use crate::support::*;

use predicates::prelude::*;

#[test]
fn test_missing_file_names_path() {
    let t = Test::new();
    t.cmd()
        .args(["decrypt", "nope.yaml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_folded_block_scalar_rejected() {
    let t = Test::new();
    t.write(
        "secrets.yaml",
        "kind: DecryptedSecret\nmetadata:\n  name: f\ndata:\n  NOTE: >\n    folded text\n",
    );

    let output = t.encrypt("secrets.yaml", KEY_ID);
    assert_failure(&output);
    assert_stderr_contains(&output, "secrets.yaml: document 1 (f): ");
    assert_stderr_contains(&output, "unsupported block scalar '>'");
}

#[test]
fn test_invalid_config_fails() {
    let t = Test::new();
    t.write(".kubecrypt.toml", "data_key_policy = \"sometimes\"\n");
    t.write("secrets.yaml", TWO_DOCS);

    let output = t.encrypt("secrets.yaml", KEY_ID);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}

#[test]
fn test_completions() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kubecrypt"));
}

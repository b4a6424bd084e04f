use crate::support::*;

#[test]
fn test_encrypt_prints_sealed_manifest() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);

    let output = t.encrypt("secrets.yaml", KEY_ID);
    assert_success(&output);

    assert_all_sealed(&stdout(&output));
    assert_eq!(t.read("secrets.yaml"), TWO_DOCS, "input must be untouched");
}

#[test]
fn test_encrypt_in_place() {
    let t = Test::new();
    t.write("secrets.yaml", COMMENTED);

    t.seal_in_place("secrets.yaml", KEY_ID);

    let sealed = t.read("secrets.yaml");
    assert_all_sealed(&sealed);
    assert!(sealed.contains("# rotated quarterly"));
    assert!(!sealed.contains("hunter2"));
}

#[test]
fn test_encrypt_to_output_file() {
    let t = Test::new();
    t.write("plain.yaml", TWO_DOCS);

    let output = t.run(&["encrypt", "plain.yaml", "--key-id", KEY_ID, "-o", "sealed.yaml"]);
    assert_success(&output);
    assert_stderr_contains(&output, "sealed.yaml");

    assert!(stdout(&output).is_empty());
    assert_all_sealed(&t.read("sealed.yaml"));
}

#[test]
fn test_key_id_from_config_file() {
    let t = Test::new();
    t.write(".kubecrypt.toml", CONFIG_WITH_KEY);
    t.write("secrets.yaml", TWO_DOCS);

    let output = t.run(&["encrypt", "secrets.yaml", "-i"]);
    assert_success(&output);

    let output = t.run(&["keys", "secrets.yaml"]);
    assert_success(&output);
    assert!(stdout(&output).contains("prod/app\talias/test"));
}

#[test]
fn test_key_id_from_env() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);

    let output = t
        .cmd()
        .args(["encrypt", "secrets.yaml"])
        .env("KUBECRYPT_KEY_ID", "from-env")
        .output()
        .unwrap();
    assert_success(&output);
    assert_all_sealed(&stdout(&output));
}

#[test]
fn test_missing_key_id_fails_without_writing() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);

    let output = t.run(&["encrypt", "secrets.yaml", "--in-place"]);
    assert_failure(&output);
    assert_eq!(output.status.code(), Some(1));
    assert_stderr_contains(&output, "no KMS key id");
    assert_stderr_contains(&output, "--key-id");

    assert_eq!(t.read("secrets.yaml"), TWO_DOCS);
}

#[test]
fn test_in_place_and_output_conflict() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);

    let output = t.run(&["encrypt", "secrets.yaml", "--in-place", "-o", "x.yaml"]);
    assert_failure(&output);
}

#[test]
fn test_force_key_id_rekeys_encrypted_file() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);
    t.seal_in_place("secrets.yaml", "old-key");

    let output = t.run(&[
        "encrypt",
        "secrets.yaml",
        "--key-id",
        "new-key",
        "--force-key-id",
        "--in-place",
    ]);
    assert_success(&output);

    let output = t.run(&["keys", "secrets.yaml"]);
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("prod/app\tnew-key"), "{}", out);
    assert!(!out.contains("old-key"), "{}", out);

    let output = t.decrypt("secrets.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), TWO_DOCS);
}

#[test]
fn test_new_data_key_reseals_encrypted_file() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);
    t.seal_in_place("secrets.yaml", KEY_ID);
    let sealed = t.read("secrets.yaml");

    let output = t.run(&["encrypt", "secrets.yaml", "--new-data-key", "-i"]);
    assert_success(&output);

    let resealed = t.read("secrets.yaml");
    assert_all_sealed(&resealed);
    assert_eq!(changed_lines(&sealed, &resealed).len(), 2);

    let output = t.decrypt("secrets.yaml");
    assert_success(&output);
    assert!(stdout(&output).contains("KEY: val"));
}

use crate::support::*;

/// Encrypt `plain` in place as secrets.yaml and decrypt it to plain.yaml.
fn session(t: &Test, plain: &str) -> String {
    t.write("secrets.yaml", plain);
    t.seal_in_place("secrets.yaml", KEY_ID);
    let output = t.run(&["decrypt", "secrets.yaml", "-o", "plain.yaml"]);
    assert_success(&output);
    t.read("secrets.yaml")
}

#[test]
fn test_reseal_without_edits_is_identical() {
    let t = Test::new();
    let sealed = session(&t, COMMENTED);

    let output = t.run(&["reseal", "plain.yaml", "--original", "secrets.yaml"]);
    assert_success(&output);
    assert_eq!(stdout(&output), sealed);
}

#[test]
fn test_reseal_changes_only_edited_value() {
    let t = Test::new();
    let sealed = session(&t, COMMENTED);
    let edited = t.read("plain.yaml").replace("USER: admin", "USER: root");
    t.write("plain.yaml", &edited);

    let output = t.run(&["reseal", "plain.yaml", "--original", "secrets.yaml", "--in-place"]);
    assert_success(&output);

    let resealed = t.read("secrets.yaml");
    let changed = changed_lines(&sealed, &resealed);
    assert_eq!(changed.len(), 1, "{:?}", changed);
    assert!(changed[0].1.starts_with("  USER: crypto "));

    let output = t.decrypt("secrets.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), COMMENTED.replace("USER: admin", "USER: root"));
}

#[test]
fn test_reseal_reports_new_documents() {
    let t = Test::new();
    session(&t, TWO_DOCS);
    let edited = format!(
        "{}---\nkind: DecryptedSecret\nmetadata:\n  name: added\ndata:\n  X: y\n",
        t.read("plain.yaml")
    );
    t.write("plain.yaml", &edited);

    let output = t.run(&[
        "reseal",
        "plain.yaml",
        "--original",
        "secrets.yaml",
        "--key-id",
        KEY_ID,
    ]);
    assert_success(&output);
    assert_stderr_contains(&output, "1 new document(s)");
    assert_all_sealed(&stdout(&output));
}

use crate::support::*;

#[test]
fn test_keys_lists_documents_and_aliases() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);
    t.seal_in_place("secrets.yaml", "key-1");

    let output = t.run(&["keys", "secrets.yaml"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "prod/app\tkey-1\talias/stub-key-1\nprod/tls\tkey-1\talias/stub-key-1\n"
    );
}

#[test]
fn test_keys_marks_unencrypted_documents() {
    let t = Test::new();
    t.write("plain.yaml", TWO_DOCS);

    let output = t.run(&["keys", "plain.yaml"]);
    assert_success(&output);
    assert!(stdout(&output).starts_with("prod/app\t-\n"));
}

#[test]
fn test_keys_without_secrets() {
    let t = Test::new();
    t.write("cm.yaml", "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: x\n");

    let output = t.run(&["keys", "cm.yaml"]);
    assert_success(&output);
    assert_stderr_contains(&output, "no secret documents");
}

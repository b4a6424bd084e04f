use crate::support::*;

use kubecrypt::core::cipher::Payload;

#[test]
fn test_decrypt_restores_original_text() {
    let t = Test::new();
    t.write("secrets.yaml", COMMENTED);
    t.seal_in_place("secrets.yaml", KEY_ID);

    let output = t.decrypt("secrets.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), COMMENTED);
}

#[test]
fn test_decrypt_to_output_file() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);
    t.seal_in_place("secrets.yaml", KEY_ID);

    let output = t.run(&["decrypt", "secrets.yaml", "--output", "plain.yaml"]);
    assert_success(&output);
    assert_eq!(t.read("plain.yaml"), TWO_DOCS);
}

#[test]
fn test_decrypt_plain_file_is_noop() {
    let t = Test::new();
    t.write("plain.yaml", TWO_DOCS);

    let output = t.decrypt("plain.yaml");
    assert_success(&output);
    assert_eq!(stdout(&output), TWO_DOCS);
}

#[test]
fn test_tampered_value_fails_authentication() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);
    t.seal_in_place("secrets.yaml", KEY_ID);

    let sealed = t.read("secrets.yaml");
    let line = sealed
        .lines()
        .find(|l| l.starts_with("  KEY: "))
        .unwrap()
        .to_string();
    let value = line.trim_start_matches("  KEY: ");
    let mut payload = Payload::decode("KEY", value).unwrap();
    payload.ciphertext[0] ^= 0xff;
    let tampered = sealed.replace(value, &payload.encode().unwrap());
    t.write("secrets.yaml", &tampered);

    let output = t.decrypt("secrets.yaml");
    assert_failure(&output);
    assert_stderr_contains(&output, "secrets.yaml: prod/app: ");
    assert_stderr_contains(&output, "authentication failed for key 'KEY'");
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::new();
    t.write("secrets.yaml", TWO_DOCS);
    t.seal_in_place("secrets.yaml", KEY_ID);

    let output = t.run(&["--verbose", "decrypt", "secrets.yaml"]);
    assert_success(&output);
    assert_stderr_contains(&output, "decrypted object");
    assert_eq!(stdout(&output), TWO_DOCS);
}

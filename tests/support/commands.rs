//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a kubecrypt command isolated from the user's config.
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("kubecrypt").expect("failed to find kubecrypt binary");
        cmd.env("HOME", self.home.path());
        cmd.env("USERPROFILE", self.home.path());
        cmd.env("XDG_CONFIG_HOME", self.home.path().join(".config"));
        cmd.env_remove("KUBECRYPT_CONFIG");
        cmd.env_remove("KUBECRYPT_KEY_ID");
        cmd.env_remove("KUBECRYPT_LOG");
        cmd.env("NO_COLOR", "1");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Run with arguments and capture the output.
    pub fn run(&self, args: &[&str]) -> Output {
        self.cmd().args(args).output().expect("failed to run kubecrypt")
    }

    /// Shortcut for `kubecrypt encrypt FILE --key-id KEY`.
    pub fn encrypt(&self, file: &str, key_id: &str) -> Output {
        self.run(&["encrypt", file, "--key-id", key_id])
    }

    /// Shortcut for `kubecrypt decrypt FILE`.
    pub fn decrypt(&self, file: &str) -> Output {
        self.run(&["decrypt", file])
    }

    /// Encrypt `file` in place, panicking on failure.
    pub fn seal_in_place(&self, file: &str, key_id: &str) {
        let output = self.run(&["encrypt", file, "--key-id", key_id, "--in-place"]);
        assert!(
            output.status.success(),
            "encrypt failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

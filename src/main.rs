//! Kubecrypt - edit KMS-encrypted secrets in YAML manifests.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use kubecrypt::cli::output;
use kubecrypt::cli::{execute, Cli};
use kubecrypt::error::{CipherError, Error, KmsError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("KUBECRYPT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("kubecrypt=debug")
        } else {
            EnvFilter::new("kubecrypt=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command) {
        let suggestion = match e.root() {
            Error::Cipher(CipherError::MissingKeyId) => {
                Some("pass --key-id, set KUBECRYPT_KEY_ID, or set key_id in .kubecrypt.toml")
            }
            Error::Cipher(CipherError::Authentication { .. }) => {
                Some("the file was modified after encryption; restore it from version control")
            }
            Error::Kms(KmsError::NotCompiled) => Some("cargo install kubecrypt --features aws"),
            Error::InvariantViolation(_) => Some("this is a bug; please report it with the manifest layout"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

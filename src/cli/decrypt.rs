//! Decrypt command.

use std::path::Path;

use tracing::debug;

use crate::cli::files;
use crate::core::cipher::Envelope;
use crate::core::config::Config;
use crate::core::kms;
use crate::error::Result;

/// Decrypt every EncryptedSecret in `file`.
pub fn execute(file: &Path, output: Option<&Path>) -> Result<()> {
    let config = Config::load()?;
    let manifest = files::load(file)?;
    let kms = kms::connect(&config)?;

    let mut engine = Envelope::new(kms.as_ref());
    let decrypted = engine
        .decrypt_manifest(&manifest)
        .map_err(|e| e.in_file(file))?;
    debug!(data_keys = engine.cached_keys(), "decrypt finished");

    files::emit(&decrypted, output)
}

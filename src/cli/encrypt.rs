//! Encrypt command.

use std::path::Path;

use tracing::debug;

use crate::cli::{files, Destination, EncryptArgs};
use crate::core::cipher::Envelope;
use crate::core::config::Config;
use crate::core::kms;
use crate::error::Result;

/// Encrypt every DecryptedSecret in `file`.
pub fn execute(file: &Path, args: &EncryptArgs, dest: &Destination) -> Result<()> {
    let config = Config::load()?;
    let opts = args.options(&config);
    let manifest = files::load(file)?;
    let kms = kms::connect(&config)?;

    let mut engine = Envelope::new(kms.as_ref());
    let encrypted = engine
        .encrypt_manifest(&manifest, &opts)
        .map_err(|e| e.in_file(file))?;
    debug!(data_keys = engine.cached_keys(), "encrypt finished");

    files::emit(&encrypted, dest.resolve(file).as_deref())
}

//! Reseal command.
//!
//! The non-interactive half of an edit session: `original` is the
//! encrypted manifest, `edited` a decrypted copy someone changed. Values
//! that were not edited keep their exact ciphertext.

use std::path::Path;

use tracing::debug;

use crate::cli::{files, output, Destination, EncryptArgs};
use crate::core::cipher::Envelope;
use crate::core::config::Config;
use crate::core::correlate::correlate;
use crate::core::kms;
use crate::error::Result;

/// Encrypt `edited` against the baselines in `original`.
///
/// `--in-place` overwrites `original`.
pub fn execute(edited: &Path, original: &Path, args: &EncryptArgs, dest: &Destination) -> Result<()> {
    let config = Config::load()?;
    let opts = args.options(&config);
    let before = files::load(original)?;
    let mut after = files::load(edited)?;
    let kms = kms::connect(&config)?;

    let mut engine = Envelope::new(kms.as_ref());
    let baseline = engine
        .decrypt_manifest(&before)
        .map_err(|e| e.in_file(original))?;

    let matched = correlate(&mut after, &baseline);
    let unmatched = after.secrets().count() - matched;
    if unmatched > 0 {
        output::dimmed(&format!("{} new document(s) will be fully encrypted", unmatched));
    }

    let sealed = engine
        .encrypt_manifest(&after, &opts)
        .map_err(|e| e.in_file(edited))?;
    debug!(matched, unmatched, data_keys = engine.cached_keys(), "reseal finished");

    files::emit(&sealed, dest.resolve(original).as_deref())
}

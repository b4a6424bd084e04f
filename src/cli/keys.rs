//! Keys command.
//!
//! Lists each secret document with the KMS key that protects it and that
//! key's aliases. Display only.

use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{files, output};
use crate::core::cipher::Envelope;
use crate::core::config::Config;
use crate::core::kms;
use crate::error::Result;

/// Show key ids and aliases.
pub fn execute(file: &Path) -> Result<()> {
    let config = Config::load()?;
    let manifest = files::load(file)?;
    if manifest.secrets().next().is_none() {
        output::dimmed("no secret documents");
        return Ok(());
    }
    let kms = kms::connect(&config)?;

    // Decrypting is the only way to learn which key protects a document.
    let mut engine = Envelope::new(kms.as_ref());
    let decrypted = engine
        .decrypt_manifest(&manifest)
        .map_err(|e| e.in_file(file))?;

    let mut aliases: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut out = String::new();
    for obj in decrypted.secrets() {
        let line = match obj.key_id() {
            Some(key_id) => {
                if !aliases.contains_key(key_id) {
                    aliases.insert(key_id.to_string(), kms.list_aliases(key_id)?);
                }
                let names = &aliases[key_id];
                if names.is_empty() {
                    format!("{}\t{}\n", obj.display_name(), key_id)
                } else {
                    format!("{}\t{}\t{}\n", obj.display_name(), key_id, names.join(","))
                }
            }
            None => format!("{}\t-\n", obj.display_name()),
        };
        out.push_str(&line);
    }

    Ok(output::data(&out)?)
}

//! Typed decoding of manifest documents.

use serde::Deserialize;
use tracing::trace;

use crate::core::manifest::object::{ObjectMeta, SecretKind};
use crate::core::types::SecretData;
use crate::error::{ManifestError, Result};

/// Result of decoding one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Some other kind of document.
    Foreign,
    /// An encrypted or decrypted secret.
    Secret {
        kind: SecretKind,
        meta: ObjectMeta,
        data: SecretData,
    },
}

/// Decodes raw document text into a typed secret.
///
/// An unrecognized kind is `Decoded::Foreign`, not an error. Errors are
/// reserved for documents that cannot be read at all.
pub trait Decoder {
    fn decode(&self, raw: &str) -> Result<Decoded>;
}

/// Decoder for YAML documents.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlDecoder;

#[derive(Deserialize)]
struct TypeMeta {
    #[serde(default)]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct SecretManifest {
    #[serde(default)]
    metadata: ObjectMeta,
    #[serde(default)]
    data: Option<SecretData>,
}

impl Decoder for YamlDecoder {
    fn decode(&self, raw: &str) -> Result<Decoded> {
        let type_meta: TypeMeta = serde_yaml::from_str(raw).map_err(ManifestError::Decode)?;
        let Some(kind) = type_meta.kind.as_deref().and_then(SecretKind::from_kind) else {
            trace!(kind = ?type_meta.kind, "passing through foreign document");
            return Ok(Decoded::Foreign);
        };

        let manifest: SecretManifest = serde_yaml::from_str(raw).map_err(ManifestError::Decode)?;
        Ok(Decoded::Secret {
            kind,
            meta: manifest.metadata,
            data: manifest.data.unwrap_or_default(),
        })
    }
}

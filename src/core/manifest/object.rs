//! One manifest document.
//!
//! An `Object` keeps the document's original text untouched and layers the
//! decoded secret state on top of it. Decrypt and encrypt never mutate an
//! object; they derive a new one that shares the same raw text and layout.

use serde::Deserialize;
use std::fmt;

use crate::core::constants::{KIND_DECRYPTED, KIND_ENCRYPTED};
use crate::core::manifest::index::{self, Layout};
use crate::core::types::{KeyId, SecretData};
use crate::error::{Error, Result};

/// Kinds of document this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    Encrypted,
    Decrypted,
}

impl SecretKind {
    /// Recognize a `kind:` value.
    pub fn from_kind(kind: &str) -> Option<Self> {
        match kind {
            KIND_ENCRYPTED => Some(Self::Encrypted),
            KIND_DECRYPTED => Some(Self::Decrypted),
            _ => None,
        }
    }

    /// The `kind:` value written for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypted => KIND_ENCRYPTED,
            Self::Decrypted => KIND_DECRYPTED,
        }
    }
}

/// Identity fields of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl fmt::Display for ObjectMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.namespace.is_empty(), self.name.is_empty()) {
            (_, true) => write!(f, "<unnamed>"),
            (true, false) => write!(f, "{}", self.name),
            (false, false) => write!(f, "{}/{}", self.namespace, self.name),
        }
    }
}

/// Secret state of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secret {
    /// Not a secret document; written back byte for byte.
    Foreign,
    /// Values are ciphertext.
    Encrypted(SecretData),
    /// Values are plaintext.
    Decrypted(SecretData),
}

impl Secret {
    pub fn kind(&self) -> Option<SecretKind> {
        match self {
            Self::Foreign => None,
            Self::Encrypted(_) => Some(SecretKind::Encrypted),
            Self::Decrypted(_) => Some(SecretKind::Decrypted),
        }
    }

    pub fn data(&self) -> Option<&SecretData> {
        match self {
            Self::Foreign => None,
            Self::Encrypted(data) | Self::Decrypted(data) => Some(data),
        }
    }
}

/// Snapshots taken when an object was decrypted.
///
/// Encrypt compares the edited plaintext against `decrypted` and, for values
/// that did not change, reuses the ciphertext from `encrypted`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    pub encrypted: SecretData,
    pub decrypted: SecretData,
}

/// One document of a manifest.
#[derive(Debug, Clone)]
pub struct Object {
    pub(crate) raw: String,
    pub(crate) meta: ObjectMeta,
    pub(crate) secret: Secret,
    pub(crate) layout: Option<Layout>,
    pub(crate) key_id: Option<KeyId>,
    pub(crate) baseline: Option<Baseline>,
}

impl Object {
    /// A document that is passed through untouched.
    pub fn foreign(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            meta: ObjectMeta::default(),
            secret: Secret::Foreign,
            layout: None,
            key_id: None,
            baseline: None,
        }
    }

    /// A secret document, indexed against its raw text.
    ///
    /// # Errors
    ///
    /// Returns indexer errors, or `Error::InvariantViolation` if the indexed
    /// keys do not match the decoded data one to one.
    pub fn secret(raw: impl Into<String>, meta: ObjectMeta, secret: Secret) -> Result<Self> {
        let raw = raw.into();
        let layout = index::locate(&raw)?;
        if let Some(data) = secret.data() {
            check_layout(&layout, data)?;
        }
        Ok(Self {
            raw,
            meta,
            secret,
            layout: Some(layout),
            key_id: None,
            baseline: None,
        })
    }

    /// Derive an object with new secret state over the same raw text.
    pub(crate) fn with_secret(&self, secret: Secret) -> Self {
        Self {
            raw: self.raw.clone(),
            meta: self.meta.clone(),
            secret,
            layout: self.layout.clone(),
            key_id: self.key_id.clone(),
            baseline: self.baseline.clone(),
        }
    }

    /// The original document text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    pub fn secret_state(&self) -> &Secret {
        &self.secret
    }

    /// The kind string as it will be written: empty for foreign documents.
    pub fn kind(&self) -> &'static str {
        self.secret.kind().map_or("", |k| k.as_str())
    }

    pub fn data(&self) -> Option<&SecretData> {
        self.secret.data()
    }

    pub fn is_foreign(&self) -> bool {
        matches!(self.secret, Secret::Foreign)
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    /// KMS key the object's values were (or will be) encrypted under.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Human-readable identity for logs and error context.
    pub fn display_name(&self) -> String {
        self.meta.to_string()
    }
}

/// Every data key must have exactly one indexed location.
fn check_layout(layout: &Layout, data: &SecretData) -> Result<()> {
    if layout.keys.len() != data.len() {
        return Err(Error::InvariantViolation(format!(
            "indexed {} data keys but document has {}",
            layout.keys.len(),
            data.len()
        )));
    }
    for key in data.keys() {
        let count = layout.keys.iter().filter(|loc| &loc.key == key).count();
        if count != 1 {
            return Err(Error::InvariantViolation(format!(
                "data key '{}' indexed {} times",
                key, count
            )));
        }
    }
    Ok(())
}

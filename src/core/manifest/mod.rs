//! Multi-document manifests.
//!
//! A manifest is the ordered list of documents in one file. Parsing keeps
//! every document's text so that rendering changes nothing but secret
//! values.

pub mod decode;
pub mod index;
pub mod object;
pub mod render;

use tracing::debug;

use crate::core::constants::DOCUMENT_SEPARATOR;
use crate::error::{Error, Result};

pub use decode::{Decoded, Decoder, YamlDecoder};
pub use index::{locate, KeyLoc, Layout};
pub use object::{Baseline, Object, ObjectMeta, Secret, SecretKind};

/// An ordered list of documents.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    objects: Vec<Object>,
}

impl Manifest {
    /// Parse a manifest with the YAML decoder.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, &YamlDecoder)
    }

    /// Parse a manifest, decoding each document with `decoder`.
    ///
    /// Empty and comment-only documents are dropped. Documents of other
    /// kinds are kept as foreign objects.
    ///
    /// # Errors
    ///
    /// Decoder and indexer errors, wrapped with the document's position
    /// (and name, once known).
    pub fn parse_with(text: &str, decoder: &dyn Decoder) -> Result<Self> {
        let mut objects = Vec::new();
        for (index, chunk) in split_documents(text).into_iter().enumerate() {
            if is_empty_document(&chunk) {
                continue;
            }
            let object = match decoder.decode(&chunk) {
                Ok(Decoded::Foreign) => Object::foreign(chunk),
                Ok(Decoded::Secret { kind, meta, data }) => {
                    let name = meta.to_string();
                    let secret = match kind {
                        SecretKind::Encrypted => Secret::Encrypted(data),
                        SecretKind::Decrypted => Secret::Decrypted(data),
                    };
                    Object::secret(chunk, meta, secret)
                        .map_err(|e| e.in_object(format!("document {} ({})", index + 1, name)))?
                }
                Err(e) => return Err(e.in_object(format!("document {}", index + 1))),
            };
            objects.push(object);
        }

        debug!(
            documents = objects.len(),
            secrets = objects.iter().filter(|o| !o.is_foreign()).count(),
            "parsed manifest"
        );
        Ok(Self { objects })
    }

    /// Build a manifest from objects.
    pub fn from_objects(objects: Vec<Object>) -> Self {
        Self { objects }
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [Object] {
        &mut self.objects
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Secret documents only.
    pub fn secrets(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter().filter(|o| !o.is_foreign())
    }

    /// Render the manifest, separating documents with `---`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvariantViolation` if an object's data no longer
    /// matches its indexed layout.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for (i, obj) in self.objects.iter().enumerate() {
            if i > 0 {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(DOCUMENT_SEPARATOR);
                out.push('\n');
            }
            let text = render::render_object(obj).map_err(|e| wrap(e, obj))?;
            out.push_str(&text);
        }
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a Object;
    type IntoIter = std::slice::Iter<'a, Object>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

fn wrap(err: Error, obj: &Object) -> Error {
    err.in_object(obj.display_name())
}

/// Split on lines that are exactly `---`.
fn split_documents(text: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if bare == DOCUMENT_SEPARATOR {
            docs.push(std::mem::take(&mut current));
        } else {
            current.push_str(line);
        }
    }
    docs.push(current);
    docs
}

/// Only whitespace and comments.
fn is_empty_document(doc: &str) -> bool {
    doc.lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

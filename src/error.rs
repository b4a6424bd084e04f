//! Error types.
//!
//! Each concern has its own enum; `Error` aggregates them. Context wrappers
//! (`Object`, `File`) carry the location a caller needs to report a failure.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Kms(#[from] KmsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Indexer output disagrees with the decoded document.
    ///
    /// Never a user error: the manifest was accepted by the decoder but the
    /// byte-range scan did not find the same structure.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Failure while processing one manifest document.
    #[error("{object}: {source}")]
    Object {
        object: String,
        #[source]
        source: Box<Error>,
    },

    /// Failure while processing a file.
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap with the identity of the document being processed.
    pub fn in_object(self, object: impl Into<String>) -> Self {
        Self::Object {
            object: object.into(),
            source: Box::new(self),
        }
    }

    /// Wrap with the path of the file being processed.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with context wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Self::Object { source, .. } | Self::File { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Manifest parsing and indexing errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The data block could not be matched to key/value pairs.
    #[error("cannot parse data keys: {0}")]
    KeysParse(String),

    /// Only `|` block scalars are understood.
    #[error("unsupported block scalar '{indicator}' for key '{key}' (only '|' is supported)")]
    UnsupportedBlockScalar { key: String, indicator: String },

    /// A secret document has no `kind:` line the indexer can find.
    #[error("no top-level kind field found")]
    MissingKind,

    /// The decoder rejected a document for a reason other than its kind.
    #[error("invalid document: {0}")]
    Decode(#[from] serde_yaml::Error),
}

/// Envelope encryption errors.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("no KMS key id known for this object")]
    MissingKeyId,

    #[error("key '{key}' was encrypted with KMS key {found}, but earlier values used {expected}")]
    KeyIdMismatch {
        key: String,
        expected: String,
        found: String,
    },

    #[error("authentication failed for key '{key}': value was tampered with or sealed under another data key")]
    Authentication { key: String },

    #[error("invalid payload for key '{key}': {reason}")]
    InvalidPayload { key: String, reason: String },

    #[error("invalid base64 for key '{key}': {reason}")]
    InvalidBase64 { key: String, reason: String },

    #[error("decrypted value for key '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("data key has {0} bytes, expected 32")]
    InvalidDataKey(usize),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Operation called on an object of the wrong kind.
    #[error("{0}")]
    Precondition(String),
}

/// KMS capability errors.
#[derive(Error, Debug)]
pub enum KmsError {
    #[error("KMS {operation} failed: {reason}")]
    Request {
        operation: &'static str,
        reason: String,
    },

    #[error("KMS {0} returned an empty response")]
    EmptyResponse(&'static str),

    #[error("KMS support not compiled. Rebuild with: cargo install kubecrypt --features aws")]
    NotCompiled,
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

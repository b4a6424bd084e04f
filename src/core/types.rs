//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;
use std::ops::Range;

/// A key inside a secret's `data:` map (e.g. `DATABASE_URL`, `tls.key`).
pub type SecretKey = String;

/// A KMS key identifier: key id, key ARN, or alias.
pub type KeyId = String;

/// Key/value pairs of one secret document.
///
/// Ciphertext or plaintext depending on the document kind.
pub type SecretData = BTreeMap<SecretKey, String>;

/// A byte range into a document's raw text.
pub type Span = Range<usize>;

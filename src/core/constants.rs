//! Constants used throughout kubecrypt.
//!
//! Centralizes magic strings and wire-format values.

/// Project-local configuration file name.
pub const CONFIG_FILE: &str = ".kubecrypt.toml";

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV: &str = "KUBECRYPT_CONFIG";

/// Line separating documents in a manifest stream.
pub const DOCUMENT_SEPARATOR: &str = "---";

/// Kind of a document whose data values are ciphertext.
pub const KIND_ENCRYPTED: &str = "EncryptedSecret";

/// Kind of a document whose data values are plaintext.
pub const KIND_DECRYPTED: &str = "DecryptedSecret";

/// Prefix of values sealed under a KMS-wrapped data key.
pub const CRYPTO_TAG: &str = "crypto ";

/// Base64 prefix of a raw KMS ciphertext blob (legacy direct-KMS values).
pub const LEGACY_KMS_PREFIX: &str = "AQICAH";

/// Stands in for an empty plaintext, which KMS refuses to encrypt.
pub const EMPTY_SENTINEL: &str = "__kubecrypt_empty_value__";

/// Encryption context key sent with every KMS request.
pub const ENCRYPTION_CONTEXT_KEY: &str = "RidecellOperator";

/// Encryption context value sent with every KMS request.
pub const ENCRYPTION_CONTEXT_VALUE: &str = "true";

/// Data key length in bytes.
pub const DATA_KEY_LEN: usize = 32;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 24;

/// Extra indentation of block scalar lines relative to their key.
pub const BLOCK_INDENT: usize = 2;

//! KMS capability.
//!
//! The engine needs three operations from a key management service:
//! minting a data key, unwrapping a ciphertext blob, and (for display only)
//! listing a key's aliases. Every request carries the fixed encryption
//! context from `constants`.
//!
//! ## Backends
//!
//! - **AWS KMS**: Feature-gated (`aws`). Uses `aws-sdk-kms`.
//! - **Stub**: Unit tests and the `test-kms` feature. Not secure.

use std::fmt::Debug;

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::config::Config;
use crate::core::types::KeyId;
use crate::error::Result;

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(any(test, feature = "test-kms"))]
pub mod stub;

/// A freshly generated data key.
pub struct GeneratedKey {
    /// Plaintext key material; never persisted.
    pub plaintext: Zeroizing<Vec<u8>>,
    /// The key wrapped by KMS; stored alongside the data it protects.
    pub wrapped: Vec<u8>,
}

/// Result of a KMS decrypt call.
pub struct Unwrapped {
    pub plaintext: Zeroizing<Vec<u8>>,
    /// The KMS key that had encrypted the blob.
    pub key_id: KeyId,
}

/// Remote key management operations.
pub trait Kms: Debug {
    /// Generate a 32-byte data key under `key_id`.
    fn generate_data_key(&self, key_id: &str) -> Result<GeneratedKey>;

    /// Decrypt a KMS ciphertext blob (a wrapped data key or a legacy value).
    fn decrypt(&self, blob: &[u8]) -> Result<Unwrapped>;

    /// Alias names pointing at `key_id`.
    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>>;
}

/// Create the KMS client for this build.
///
/// `test-kms` builds always get the stub; otherwise AWS when compiled in.
#[allow(unused_variables)]
pub fn connect(config: &Config) -> Result<Box<dyn Kms>> {
    #[cfg(feature = "test-kms")]
    {
        debug!("using stub KMS");
        return Ok(Box::new(stub::StubKms::new()));
    }

    #[cfg(all(not(feature = "test-kms"), feature = "aws"))]
    {
        debug!(
            region = ?config.aws.region,
            profile = ?config.aws.profile,
            "connecting to AWS KMS"
        );
        return Ok(Box::new(aws::AwsKms::new(&config.aws)?));
    }

    #[cfg(all(not(feature = "test-kms"), not(feature = "aws")))]
    {
        debug!("no KMS backend compiled");
        Err(crate::error::KmsError::NotCompiled.into())
    }
}

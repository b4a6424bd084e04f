//! Per-invocation cache of unwrapped data keys.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::DataKey;
use crate::core::kms::Kms;
use crate::core::types::KeyId;
use crate::error::{CipherError, Result};

/// An unwrapped data key.
#[derive(Clone)]
pub struct CachedKey {
    pub key: Zeroizing<DataKey>,
    /// The KMS key that wraps it, when known.
    pub key_id: Option<KeyId>,
}

/// Maps wrapped key blobs to their plaintext, so each distinct blob costs
/// at most one KMS call.
#[derive(Default)]
pub struct KeyCache {
    entries: HashMap<Vec<u8>, CachedKey>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the plaintext for `wrapped`, asking KMS on a miss.
    pub fn resolve(&mut self, kms: &dyn Kms, wrapped: &[u8]) -> Result<CachedKey> {
        if let Some(hit) = self.entries.get(wrapped) {
            trace!(wrapped = %fingerprint(wrapped), "data key cache hit");
            return Ok(hit.clone());
        }

        debug!(wrapped = %fingerprint(wrapped), "unwrapping data key");
        let unwrapped = kms.decrypt(wrapped)?;
        let entry = CachedKey {
            key: to_data_key(&unwrapped.plaintext)?,
            key_id: Some(unwrapped.key_id),
        };
        self.entries.insert(wrapped.to_vec(), entry.clone());
        Ok(entry)
    }

    /// Remember a key this process generated itself.
    pub fn insert(&mut self, wrapped: Vec<u8>, entry: CachedKey) {
        self.entries.insert(wrapped, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Copy KMS key material into a fixed-size key.
pub(crate) fn to_data_key(bytes: &[u8]) -> Result<Zeroizing<DataKey>> {
    let key: DataKey = bytes
        .try_into()
        .map_err(|_| CipherError::InvalidDataKey(bytes.len()))?;
    Ok(Zeroizing::new(key))
}

/// Short, non-reversible label for a wrapped key in logs.
pub(crate) fn fingerprint(wrapped: &[u8]) -> String {
    Sha256::digest(wrapped)[..6]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

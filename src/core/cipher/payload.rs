//! Wire format of a data-key sealed value.
//!
//! `crypto <base64(bincode(Payload))>`

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::core::constants::{CRYPTO_TAG, NONCE_LEN};
use crate::error::{CipherError, Result};

/// A sealed value together with the wrapped data key that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub wrapped_key: Vec<u8>,
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Payload {
    /// Whether a stored value uses this format (rather than direct KMS).
    pub fn is_tagged(value: &str) -> bool {
        value.starts_with(CRYPTO_TAG)
    }

    /// Armor as a tagged string.
    pub fn encode(&self) -> Result<String> {
        let bytes = bincode::serialize(self)
            .map_err(|e| CipherError::EncryptionFailed(format!("failed to encode payload: {}", e)))?;
        Ok(format!("{}{}", CRYPTO_TAG, STANDARD.encode(bytes)))
    }

    /// Parse a tagged string. `key` names the data entry in errors.
    pub fn decode(key: &str, value: &str) -> Result<Self> {
        let armored = value
            .strip_prefix(CRYPTO_TAG)
            .ok_or_else(|| CipherError::InvalidPayload {
                key: key.to_string(),
                reason: format!("missing '{}' tag", CRYPTO_TAG.trim_end()),
            })?;
        let bytes = STANDARD
            .decode(armored.trim())
            .map_err(|e| CipherError::InvalidBase64 {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        bincode::deserialize(&bytes).map_err(|e| {
            CipherError::InvalidPayload {
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

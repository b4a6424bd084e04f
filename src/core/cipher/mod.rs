//! Envelope encryption of secret values.
//!
//! Values are sealed with XChaCha20-Poly1305 under a 32-byte data key. The
//! data key is minted by KMS, which also returns it wrapped under a
//! centrally managed key; the wrapped form travels inside every value's
//! `Payload`, so only one KMS call per data key is needed to decrypt.
//!
//! Older values were encrypted by KMS directly and are still readable.

mod cache;
mod envelope;
mod payload;

pub use cache::{CachedKey, KeyCache};
pub use envelope::{DataKeyPolicy, EncryptOptions, Envelope};
pub use payload::Payload;

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::core::constants::{DATA_KEY_LEN, NONCE_LEN};
use crate::error::{CipherError, Result};

/// Plaintext data key.
pub type DataKey = [u8; DATA_KEY_LEN];

/// Seal `plaintext` under `key` with a fresh random nonce.
pub fn seal(key: &DataKey, plaintext: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
    Ok((nonce, ciphertext))
}

/// Open a sealed value. `key_name` names the data key entry in errors.
///
/// # Errors
///
/// Returns `CipherError::Authentication` if the ciphertext was modified or
/// sealed under a different key.
pub fn open(
    key: &DataKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
    key_name: &str,
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            CipherError::Authentication {
                key: key_name.to_string(),
            }
            .into()
        })
}

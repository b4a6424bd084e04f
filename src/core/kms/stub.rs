//! Stub KMS for tests.
//!
//! Wrapped blobs are `stub:<key id>:<hex plaintext>`: NOT secure, just
//! enough to exercise the envelope plumbing without a network. Blobs are
//! self-describing, so separate processes can unwrap each other's keys.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use super::{GeneratedKey, Kms, Unwrapped};
use crate::core::constants::DATA_KEY_LEN;
use crate::error::{KmsError, Result};

const PREFIX: &str = "stub:";

/// In-process KMS that records how often it is called.
#[derive(Debug, Default)]
pub struct StubKms {
    generate_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
}

impl StubKms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encrypt `plaintext` directly under `key_id`, as a legacy value would be.
    pub fn encrypt_direct(key_id: &str, plaintext: &[u8]) -> Vec<u8> {
        let hex: String = plaintext.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{}{}:{}", PREFIX, key_id, hex).into_bytes()
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }
}

fn invalid(reason: &str) -> KmsError {
    KmsError::Request {
        operation: "Decrypt",
        reason: reason.to_string(),
    }
}

impl Kms for StubKms {
    fn generate_data_key(&self, key_id: &str) -> Result<GeneratedKey> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let mut key = Zeroizing::new(vec![0u8; DATA_KEY_LEN]);
        OsRng.fill_bytes(&mut key);
        let wrapped = Self::encrypt_direct(key_id, &key);
        Ok(GeneratedKey {
            plaintext: key,
            wrapped,
        })
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Unwrapped> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        let text = std::str::from_utf8(blob).map_err(|_| invalid("blob is not UTF-8"))?;
        let body = text
            .strip_prefix(PREFIX)
            .ok_or_else(|| invalid("not a stub ciphertext"))?;
        let (key_id, hex) = body
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing key id"))?;
        if hex.len() % 2 != 0 {
            return Err(invalid("odd hex length").into());
        }
        let bytes: std::result::Result<Vec<u8>, _> = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16))
            .collect();
        let bytes = bytes.map_err(|e| invalid(&format!("invalid hex: {}", e)))?;
        Ok(Unwrapped {
            plaintext: Zeroizing::new(bytes),
            key_id: key_id.to_string(),
        })
    }

    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>> {
        Ok(vec![format!("alias/stub-{}", key_id)])
    }
}

//! In-memory KMS that records every call.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use kubecrypt::core::kms::{GeneratedKey, Kms, Unwrapped};
use kubecrypt::error::{KmsError, Result};

/// A KMS call, as recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Generate(String),
    Decrypt,
    ListAliases(String),
}

/// Opaque blobs mapped back to `(key id, plaintext)`.
#[derive(Debug, Default)]
pub struct RecordingKms {
    blobs: Mutex<HashMap<Vec<u8>, (String, Vec<u8>)>>,
    calls: Mutex<Vec<Call>>,
    aliases: HashMap<String, Vec<String>>,
}

impl RecordingKms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, key_id: &str, alias: &str) -> Self {
        self.aliases
            .entry(key_id.to_string())
            .or_default()
            .push(alias.to_string());
        self
    }

    /// Encrypt directly under `key_id`, the way legacy values were written.
    pub fn encrypt_direct(&self, key_id: &str, plaintext: &[u8]) -> Vec<u8> {
        // Same leading bytes as real KMS ciphertext, which base64 to "AQICAH".
        let mut blob = vec![0x01, 0x02, 0x02, 0x00, 0x78];
        let mut id = [0u8; 16];
        OsRng.fill_bytes(&mut id);
        blob.extend_from_slice(&id);
        self.blobs
            .lock()
            .unwrap()
            .insert(blob.clone(), (key_id.to_string(), plaintext.to_vec()));
        blob
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Generate(_)))
    }

    pub fn decrypt_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Decrypt))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Kms for RecordingKms {
    fn generate_data_key(&self, key_id: &str) -> Result<GeneratedKey> {
        self.record(Call::Generate(key_id.to_string()));
        let mut key = vec![0u8; 32];
        OsRng.fill_bytes(&mut key);
        let wrapped = self.encrypt_direct(key_id, &key);
        Ok(GeneratedKey {
            plaintext: Zeroizing::new(key),
            wrapped,
        })
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Unwrapped> {
        self.record(Call::Decrypt);
        let blobs = self.blobs.lock().unwrap();
        let (key_id, plaintext) = blobs.get(blob).ok_or_else(|| KmsError::Request {
            operation: "Decrypt",
            reason: "InvalidCiphertextException".to_string(),
        })?;
        Ok(Unwrapped {
            plaintext: Zeroizing::new(plaintext.clone()),
            key_id: key_id.clone(),
        })
    }

    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>> {
        self.record(Call::ListAliases(key_id.to_string()));
        Ok(self.aliases.get(key_id).cloned().unwrap_or_default())
    }
}

//! The envelope engine: decrypt and encrypt whole objects.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::cache::{fingerprint, to_data_key, CachedKey, KeyCache};
use super::{open, seal, DataKey, Payload};
use crate::core::constants::{EMPTY_SENTINEL, LEGACY_KMS_PREFIX};
use crate::core::kms::Kms;
use crate::core::manifest::{Baseline, Manifest, Object, Secret};
use crate::core::types::{KeyId, SecretData};
use crate::error::{CipherError, Error, Result};

/// What to do with an object's existing data key when values are re-sealed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKeyPolicy {
    /// Keep sealing under the data key already used by the object.
    #[default]
    Reuse,
    /// Mint a new data key and re-seal every value of the object under it.
    Regenerate,
}

/// Encrypt settings.
#[derive(Debug, Default, Clone)]
pub struct EncryptOptions {
    /// Key for objects with no known key id (or all objects, when forced).
    pub default_key_id: Option<KeyId>,
    /// Use `default_key_id` even when an object already has a key id.
    pub force_key_id: bool,
    /// Re-seal every value, not just the changed ones.
    pub re_encrypt_all: bool,
    pub data_key_policy: DataKeyPolicy,
}

impl EncryptOptions {
    /// Options that encrypt under `key_id` unless an object already has one.
    pub fn with_key_id(key_id: impl Into<KeyId>) -> Self {
        Self {
            default_key_id: Some(key_id.into()),
            ..Self::default()
        }
    }

    /// Whether already-encrypted objects need touching at all.
    fn rewrites_ciphertext(&self) -> bool {
        self.force_key_id || self.re_encrypt_all || self.data_key_policy == DataKeyPolicy::Regenerate
    }
}

/// Envelope encryption engine.
///
/// Owns the data key cache for one decrypt/encrypt session; create a new
/// engine per manifest (or per edit session) rather than sharing one.
pub struct Envelope<'k> {
    kms: &'k dyn Kms,
    cache: KeyCache,
}

/// A data key in use for sealing.
struct ActiveKey {
    wrapped: Vec<u8>,
    key: Zeroizing<DataKey>,
}

impl<'k> Envelope<'k> {
    pub fn new(kms: &'k dyn Kms) -> Self {
        Self {
            kms,
            cache: KeyCache::new(),
        }
    }

    /// Number of distinct data keys seen so far.
    pub fn cached_keys(&self) -> usize {
        self.cache.len()
    }

    /// Decrypt an `EncryptedSecret` object.
    ///
    /// The result is a `DecryptedSecret` carrying the discovered key id and a
    /// baseline for a later minimal-diff encrypt.
    ///
    /// # Errors
    ///
    /// KMS failures, `KeyIdMismatch` between direct-KMS values, and
    /// authentication or format errors for sealed values, all wrapped with
    /// the object's identity.
    pub fn decrypt(&mut self, obj: &Object) -> Result<Object> {
        self.decrypt_object(obj)
            .map_err(|e| e.in_object(obj.display_name()))
    }

    /// Encrypt a `DecryptedSecret` object.
    ///
    /// Values equal to the baseline plaintext keep their old ciphertext
    /// unless `re_encrypt_all` is set.
    pub fn encrypt(&mut self, obj: &Object, opts: &EncryptOptions) -> Result<Object> {
        self.encrypt_object(obj, opts)
            .map_err(|e| e.in_object(obj.display_name()))
    }

    /// Decrypt every encrypted object; other objects pass through.
    pub fn decrypt_manifest(&mut self, manifest: &Manifest) -> Result<Manifest> {
        let objects = manifest
            .iter()
            .map(|obj| match obj.secret_state() {
                Secret::Encrypted(_) => self.decrypt(obj),
                _ => Ok(obj.clone()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Manifest::from_objects(objects))
    }

    /// Encrypt every decrypted object.
    ///
    /// Already-encrypted objects are left alone unless the options ask for
    /// re-keying or re-sealing, in which case they are decrypted first.
    pub fn encrypt_manifest(&mut self, manifest: &Manifest, opts: &EncryptOptions) -> Result<Manifest> {
        let objects = manifest
            .iter()
            .map(|obj| match obj.secret_state() {
                Secret::Decrypted(_) => self.encrypt(obj, opts),
                Secret::Encrypted(_) if opts.rewrites_ciphertext() => {
                    let decrypted = self.decrypt(obj)?;
                    self.encrypt(&decrypted, opts)
                }
                _ => Ok(obj.clone()),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Manifest::from_objects(objects))
    }

    fn decrypt_object(&mut self, obj: &Object) -> Result<Object> {
        let Secret::Encrypted(encrypted) = obj.secret_state() else {
            return Err(CipherError::Precondition(format!(
                "cannot decrypt a {} document",
                describe(obj)
            ))
            .into());
        };

        let mut direct_key_id: Option<KeyId> = None;
        let mut wrapping_key_id: Option<KeyId> = None;
        let mut plain = SecretData::new();

        for (key, value) in encrypted {
            let bytes = if Payload::is_tagged(value) {
                let payload = Payload::decode(key, value)?;
                let data_key = self
                    .cache
                    .resolve(self.kms, &payload.wrapped_key)
                    .map_err(|e| in_key(e, key))?;
                if wrapping_key_id.is_none() {
                    wrapping_key_id = data_key.key_id.clone();
                }
                Zeroizing::new(open(&data_key.key, &payload.nonce, &payload.ciphertext, key)?)
            } else {
                if !value.starts_with(LEGACY_KMS_PREFIX) {
                    debug!(key = %key, "value has neither a crypto tag nor a KMS blob prefix");
                }
                let blob = STANDARD
                    .decode(value.trim())
                    .map_err(|e| CipherError::InvalidBase64 {
                        key: key.clone(),
                        reason: e.to_string(),
                    })?;
                let unwrapped = self.kms.decrypt(&blob).map_err(|e| in_key(e, key))?;
                let expected = direct_key_id.get_or_insert_with(|| unwrapped.key_id.clone());
                if *expected != unwrapped.key_id {
                    return Err(CipherError::KeyIdMismatch {
                        key: key.clone(),
                        expected: expected.clone(),
                        found: unwrapped.key_id,
                    }
                    .into());
                }
                unwrapped.plaintext
            };

            let text = std::str::from_utf8(&bytes)
                .map_err(|_| CipherError::InvalidUtf8 { key: key.clone() })?;
            let text = if text == EMPTY_SENTINEL { "" } else { text };
            plain.insert(key.clone(), text.to_string());
        }

        let mut decrypted = obj.with_secret(Secret::Decrypted(plain.clone()));
        decrypted.key_id = direct_key_id.or(wrapping_key_id).or_else(|| obj.key_id.clone());
        decrypted.baseline = Some(Baseline {
            encrypted: encrypted.clone(),
            decrypted: plain,
        });

        debug!(
            object = %obj.display_name(),
            keys = encrypted.len(),
            key_id = ?decrypted.key_id,
            "decrypted object"
        );
        Ok(decrypted)
    }

    fn encrypt_object(&mut self, obj: &Object, opts: &EncryptOptions) -> Result<Object> {
        let Secret::Decrypted(plain) = obj.secret_state() else {
            return Err(CipherError::Precondition(format!(
                "cannot encrypt a {} document",
                describe(obj)
            ))
            .into());
        };

        let key_id = self.target_key_id(obj, opts)?;
        // An object's values share one data key, so moving to another KMS
        // key or a fresh data key re-seals all of them.
        let rekey = obj.key_id().is_some_and(|own| own != key_id);
        let regenerate = opts.data_key_policy == DataKeyPolicy::Regenerate;
        let reseal_all = opts.re_encrypt_all || rekey || regenerate;
        let baseline = obj.baseline();
        let mut active = match baseline {
            Some(baseline) if !rekey && !regenerate => self.existing_data_key(&baseline.encrypted)?,
            _ => None,
        };

        let mut encrypted = SecretData::new();
        let mut sealed = 0usize;
        for (key, value) in plain {
            if !reseal_all {
                if let Some(previous) = unchanged_ciphertext(baseline, key, value) {
                    encrypted.insert(key.clone(), previous.clone());
                    continue;
                }
            }

            let data_key = match active.take() {
                Some(data_key) => data_key,
                None => self.generate_data_key(&key_id)?,
            };
            let plaintext = if value.is_empty() { EMPTY_SENTINEL } else { value.as_str() };
            let (nonce, ciphertext) = seal(&data_key.key, plaintext.as_bytes())?;
            let payload = Payload {
                wrapped_key: data_key.wrapped.clone(),
                nonce,
                ciphertext,
            };
            encrypted.insert(key.clone(), payload.encode()?);
            active = Some(data_key);
            sealed += 1;
        }

        debug!(
            object = %obj.display_name(),
            keys = plain.len(),
            sealed,
            key_id = %key_id,
            "encrypted object"
        );

        let mut result = obj.with_secret(Secret::Encrypted(encrypted.clone()));
        result.key_id = Some(key_id);
        result.baseline = Some(Baseline {
            encrypted,
            decrypted: plain.clone(),
        });
        Ok(result)
    }

    /// The object's own key unless forced, else the default.
    fn target_key_id(&self, obj: &Object, opts: &EncryptOptions) -> Result<KeyId> {
        let own = obj.key_id().filter(|id| !id.is_empty());
        let default = opts.default_key_id.as_deref().filter(|id| !id.is_empty());
        let chosen = if opts.force_key_id {
            if default.is_none() && own.is_some() {
                warn!(
                    object = %obj.display_name(),
                    "no key id to force, keeping the object's own key"
                );
            }
            default.or(own)
        } else {
            own.or(default)
        };
        chosen
            .map(str::to_string)
            .ok_or_else(|| CipherError::MissingKeyId.into())
    }

    /// Unwrap the data key behind the first sealed value of the baseline.
    fn existing_data_key(&mut self, encrypted: &SecretData) -> Result<Option<ActiveKey>> {
        let Some((key, value)) = encrypted.iter().find(|(_, v)| Payload::is_tagged(v)) else {
            return Ok(None);
        };
        let payload = Payload::decode(key, value)?;
        let cached = self
            .cache
            .resolve(self.kms, &payload.wrapped_key)
            .map_err(|e| in_key(e, key))?;
        debug!(wrapped = %fingerprint(&payload.wrapped_key), "reusing data key");
        Ok(Some(ActiveKey {
            wrapped: payload.wrapped_key,
            key: cached.key,
        }))
    }

    fn generate_data_key(&mut self, key_id: &str) -> Result<ActiveKey> {
        let generated = self.kms.generate_data_key(key_id)?;
        let key = to_data_key(&generated.plaintext)?;
        debug!(key_id, wrapped = %fingerprint(&generated.wrapped), "generated data key");
        self.cache.insert(
            generated.wrapped.clone(),
            CachedKey {
                key: key.clone(),
                key_id: Some(key_id.to_string()),
            },
        );
        Ok(ActiveKey {
            wrapped: generated.wrapped,
            key,
        })
    }
}

/// The previous ciphertext for `key`, if its plaintext did not change.
fn unchanged_ciphertext<'a>(
    baseline: Option<&'a Baseline>,
    key: &str,
    value: &str,
) -> Option<&'a String> {
    let baseline = baseline?;
    if baseline.decrypted.get(key).map(String::as_str) != Some(value) {
        return None;
    }
    baseline.encrypted.get(key)
}

fn in_key(err: Error, key: &str) -> Error {
    err.in_object(format!("key '{}'", key))
}

fn describe(obj: &Object) -> &'static str {
    match obj.kind() {
        "" => "foreign",
        kind => kind,
    }
}

//! AWS KMS backend.
//!
//! Enable with `--features aws`. Credentials come from the default provider
//! chain (environment, profile, instance role); region and profile can be
//! pinned in the `[aws]` config section.

use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use tracing::trace;
use zeroize::Zeroizing;

use super::{GeneratedKey, Kms, Unwrapped};
use crate::core::config::AwsSettings;
use crate::core::constants::{DATA_KEY_LEN, ENCRYPTION_CONTEXT_KEY, ENCRYPTION_CONTEXT_VALUE};
use crate::error::{KmsError, Result};

/// AWS KMS client with its own single-threaded runtime.
#[derive(Debug)]
pub struct AwsKms {
    client: aws_sdk_kms::Client,
    runtime: tokio::runtime::Runtime,
}

impl AwsKms {
    /// Load AWS configuration and build a client.
    pub fn new(settings: &AwsSettings) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| KmsError::Request {
                operation: "connect",
                reason: format!("failed to create runtime: {}", e),
            })?;

        let config = runtime.block_on(async {
            let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
            if let Some(region) = &settings.region {
                loader = loader.region(aws_config::Region::new(region.clone()));
            }
            if let Some(profile) = &settings.profile {
                loader = loader.profile_name(profile);
            }
            loader.load().await
        });

        Ok(Self {
            client: aws_sdk_kms::Client::new(&config),
            runtime,
        })
    }
}

fn request_error<E: std::error::Error>(operation: &'static str, err: E) -> KmsError {
    KmsError::Request {
        operation,
        reason: DisplayErrorContext(err).to_string(),
    }
}

impl Kms for AwsKms {
    fn generate_data_key(&self, key_id: &str) -> Result<GeneratedKey> {
        trace!(key_id, "GenerateDataKey");
        let output = self
            .runtime
            .block_on(
                self.client
                    .generate_data_key()
                    .key_id(key_id)
                    .number_of_bytes(DATA_KEY_LEN as i32)
                    .encryption_context(ENCRYPTION_CONTEXT_KEY, ENCRYPTION_CONTEXT_VALUE)
                    .send(),
            )
            .map_err(|e| request_error("GenerateDataKey", e))?;

        let plaintext = output
            .plaintext()
            .ok_or(KmsError::EmptyResponse("GenerateDataKey"))?;
        let wrapped = output
            .ciphertext_blob()
            .ok_or(KmsError::EmptyResponse("GenerateDataKey"))?;

        Ok(GeneratedKey {
            plaintext: Zeroizing::new(plaintext.as_ref().to_vec()),
            wrapped: wrapped.as_ref().to_vec(),
        })
    }

    fn decrypt(&self, blob: &[u8]) -> Result<Unwrapped> {
        trace!(blob_len = blob.len(), "Decrypt");
        let output = self
            .runtime
            .block_on(
                self.client
                    .decrypt()
                    .ciphertext_blob(Blob::new(blob))
                    .encryption_context(ENCRYPTION_CONTEXT_KEY, ENCRYPTION_CONTEXT_VALUE)
                    .send(),
            )
            .map_err(|e| request_error("Decrypt", e))?;

        let plaintext = output.plaintext().ok_or(KmsError::EmptyResponse("Decrypt"))?;
        let key_id = output.key_id().ok_or(KmsError::EmptyResponse("Decrypt"))?;

        Ok(Unwrapped {
            plaintext: Zeroizing::new(plaintext.as_ref().to_vec()),
            key_id: key_id.to_string(),
        })
    }

    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>> {
        trace!(key_id, "ListAliases");
        let output = self
            .runtime
            .block_on(self.client.list_aliases().key_id(key_id).send())
            .map_err(|e| request_error("ListAliases", e))?;

        Ok(output
            .aliases()
            .iter()
            .filter_map(|alias| alias.alias_name().map(str::to_string))
            .collect())
    }
}

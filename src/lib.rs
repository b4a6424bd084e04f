//! Kubecrypt - edit KMS-encrypted secrets in YAML manifests.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── decrypt       # EncryptedSecret -> DecryptedSecret
//! │   ├── encrypt       # DecryptedSecret -> EncryptedSecret
//! │   ├── reseal        # Re-encrypt an edited copy with minimal diff
//! │   ├── keys          # Show KMS aliases for a manifest's keys
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── manifest/     # Documents, indexer, decoder, renderer
//!     ├── cipher/       # Envelope engine, payload format, key cache
//!     ├── kms/          # KMS trait and backends
//!     ├── correlate     # Match edited documents to their originals
//!     └── config        # .kubecrypt.toml management
//! ```
//!
//! # Guarantees
//!
//! - Rendering a parsed manifest without changes returns the input
//! - Only changed values get new ciphertext on re-encrypt
//! - Comments, key order, and foreign documents survive every operation
//! - One KMS call per distinct data key

pub mod cli;
pub mod core;
pub mod error;

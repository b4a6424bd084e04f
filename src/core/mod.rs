//! Core library components.
//!
//! Everything here is independent of the command line: parsing and
//! rendering manifests, the envelope engine, KMS clients, and configuration.

pub mod cipher;
pub mod config;
pub mod constants;
pub mod correlate;
pub mod kms;
pub mod manifest;
pub mod types;

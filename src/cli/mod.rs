//! Command-line interface.

pub mod completions;
pub mod decrypt;
pub mod encrypt;
pub mod files;
pub mod keys;
pub mod output;
pub mod reseal;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::core::cipher::{DataKeyPolicy, EncryptOptions};
use crate::core::config::Config;
use crate::error::Result;

/// Kubecrypt - edit KMS-encrypted secrets in YAML manifests.
#[derive(Parser)]
#[command(
    name = "kubecrypt",
    about = "Edit KMS-encrypted secrets in YAML manifests without losing formatting",
    version
)]
pub struct Cli {
    /// Show debug logs (or set KUBECRYPT_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Decrypt EncryptedSecret documents
    Decrypt {
        /// Manifest to decrypt
        file: PathBuf,
        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encrypt DecryptedSecret documents
    Encrypt {
        /// Manifest to encrypt
        file: PathBuf,
        #[command(flatten)]
        opts: EncryptArgs,
        #[command(flatten)]
        dest: Destination,
    },

    /// Re-encrypt an edited copy of an encrypted manifest, changing only edited values
    Reseal {
        /// Edited plaintext manifest
        edited: PathBuf,
        /// The encrypted manifest it was decrypted from
        #[arg(long)]
        original: PathBuf,
        #[command(flatten)]
        opts: EncryptArgs,
        #[command(flatten)]
        dest: Destination,
    },

    /// Show the KMS key and aliases behind each secret document
    Keys {
        /// Manifest to inspect
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Encrypt flags shared by `encrypt` and `reseal`.
#[derive(Args, Debug, Default)]
pub struct EncryptArgs {
    /// KMS key for documents without one
    #[arg(long, env = "KUBECRYPT_KEY_ID")]
    pub key_id: Option<String>,
    /// Use --key-id even for documents that already have a key
    #[arg(long)]
    pub force_key_id: bool,
    /// Re-encrypt every value, not just changed ones
    #[arg(long)]
    pub re_encrypt: bool,
    /// Re-encrypt every value under a newly minted data key
    #[arg(long)]
    pub new_data_key: bool,
}

impl EncryptArgs {
    /// Merge flags over configuration.
    pub fn options(&self, config: &Config) -> EncryptOptions {
        EncryptOptions {
            default_key_id: self.key_id.clone().or_else(|| config.key_id.clone()),
            force_key_id: self.force_key_id,
            re_encrypt_all: self.re_encrypt,
            data_key_policy: if self.new_data_key {
                DataKeyPolicy::Regenerate
            } else {
                config.data_key_policy
            },
        }
    }
}

/// Where `encrypt` and `reseal` write.
#[derive(Args, Debug, Default)]
pub struct Destination {
    /// Overwrite the input file
    #[arg(short, long, conflicts_with = "output")]
    pub in_place: bool,
    /// Write here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Destination {
    /// Resolve against the file `--in-place` would overwrite.
    pub fn resolve(&self, input: &Path) -> Option<PathBuf> {
        if self.in_place {
            Some(input.to_path_buf())
        } else {
            self.output.clone()
        }
    }
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
///
/// # Errors
///
/// Returns error if the command execution fails.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Decrypt { file, output } => decrypt::execute(&file, output.as_deref()),
        Command::Encrypt { file, opts, dest } => encrypt::execute(&file, &opts, &dest),
        Command::Reseal {
            edited,
            original,
            opts,
            dest,
        } => reseal::execute(&edited, &original, &opts, &dest),
        Command::Keys { file } => keys::execute(&file),
        Command::Completions { shell } => completions::execute(shell),
    }
}

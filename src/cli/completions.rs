//! Completions command.
//!
//! Completes the kubecrypt subcommands and their flags (`--key-id`,
//! `--original`, `--in-place`, ...). File arguments fall back to the
//! shell's own path completion.

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::{output, Cli, Shell};
use crate::error::{Error, Result};

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
        }
    }
}

/// Render the completion script for `shell`.
pub fn script(shell: Shell) -> Result<String> {
    let mut buf = Vec::new();
    generate(CompletionShell::from(shell), &mut Cli::command(), "kubecrypt", &mut buf);
    String::from_utf8(buf)
        .map_err(|e| Error::InvariantViolation(format!("completion script is not UTF-8: {}", e)))
}

/// Print the completion script to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    output::data(&script(shell)?)?;
    Ok(())
}

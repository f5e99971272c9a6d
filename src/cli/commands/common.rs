//! Common helper functions used across CLI commands
//!
//! Prompting for PINs, secrets and confirmations, and opening the vault and
//! the backend from the discovered configuration.

use anyhow::{Context, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Arc;

use clara_backend::HttpBackend;
use clara_vault::{FileVaultStore, VaultController};

use crate::Config;

pub const REMOVE_KEY_QUESTION: &str = "Remove stored key?";
pub const FLUSH_QUESTION: &str =
    "Are you sure you want to remove the current knowledge base? This action cannot be undone.";

/// Open the vault stored at the configured path.
pub fn open_vault(config: &Config) -> Result<VaultController> {
    let store = FileVaultStore::new(config.vault_path());
    VaultController::open(Arc::new(store)).context("Failed to open vault")
}

pub fn http_backend(config: &Config) -> Result<Arc<HttpBackend>> {
    let backend = HttpBackend::new(config.base_url())
        .with_context(|| format!("Failed to create HTTP client for {}", config.base_url()))?;
    Ok(Arc::new(backend))
}

/// Ask a y/N question on `writer` and read the answer from `reader`.
///
/// Only `y` or `yes` (any case) counts as consent. End of input is a no.
pub fn confirm_from<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    question: &str,
) -> io::Result<bool> {
    write!(writer, "{question} (y/N): ")?;
    writer.flush()?;

    let mut answer = String::new();
    if reader.read_line(&mut answer)? == 0 {
        writeln!(writer)?;
        return Ok(false);
    }
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Confirm on the terminal unless `--yes` was given.
pub fn confirm(question: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    confirm_from(&mut reader, &mut io::stdout(), question).context("Failed to read confirmation")
}

/// Use `--pin` when given, otherwise prompt without echo on a terminal or
/// read one line from piped stdin.
pub fn read_pin(pin: Option<String>) -> Result<String> {
    match pin {
        Some(pin) => Ok(pin),
        None => read_hidden("PIN: "),
    }
}

/// Use `--secret` when given, otherwise prompt or read one line from stdin.
pub fn read_secret(secret: Option<String>) -> Result<String> {
    match secret {
        Some(secret) => Ok(secret),
        None => read_hidden("API key: "),
    }
}

fn read_hidden(prompt: &str) -> Result<String> {
    if io::stdin().is_terminal() {
        return rpassword::prompt_password(prompt).context("Failed to read from terminal");
    }

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(strip_line_ending(&line).to_string())
}

/// Drop a single trailing `\n` or `\r\n`.
pub fn strip_line_ending(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

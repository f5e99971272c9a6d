//! Vault command implementations
//!
//! Handles `clara vault status|save|verify|clear`.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::common::{REMOVE_KEY_QUESTION, confirm, open_vault, read_pin, read_secret};
use crate::Config;

#[derive(Debug, Serialize)]
struct VaultStatusJson {
    state: &'static str,
    has_stored_secret: bool,
    path: String,
}

/// Execute the vault status command
pub fn execute_vault_status_command(config: &Config, json: bool) -> Result<()> {
    let vault = open_vault(config)?;
    let path = config.vault_path();

    if json {
        let output = VaultStatusJson {
            state: vault.state().name(),
            has_stored_secret: vault.has_stored_secret(),
            path: path.to_string(),
        };
        let rendered = serde_json::to_string_pretty(&output)
            .context("Failed to emit vault status JSON")?;
        println!("{rendered}");
        return Ok(());
    }

    if vault.has_stored_secret() {
        println!("Vault: {} (API key stored)", vault.state());
    } else {
        println!("Vault: {} (no API key stored)", vault.state());
    }
    println!("  Record: {path}");
    Ok(())
}

/// Execute the vault save command
pub fn execute_vault_save_command(
    config: &Config,
    pin: Option<String>,
    secret: Option<String>,
) -> Result<()> {
    let secret = read_secret(secret)?;
    let pin = read_pin(pin)?;

    let mut vault = open_vault(config)?;
    let replaced = vault.has_stored_secret();
    vault.save(&secret, &pin)?;

    info!(replaced, "API key saved");
    println!("Key saved securely!");
    if replaced {
        println!("  The previously stored key was replaced.");
    }
    Ok(())
}

/// Execute the vault verify command
///
/// Unlocks the vault in this process only; nothing is written.
pub fn execute_vault_verify_command(config: &Config, pin: Option<String>) -> Result<()> {
    let pin = read_pin(pin)?;
    let mut vault = open_vault(config)?;

    let secret = vault.unlock(&pin)?;
    println!("PIN accepted. Vault unlocked ({} character key).", secret.chars().count());
    vault.lock();
    Ok(())
}

/// Execute the vault clear command
pub fn execute_vault_clear_command(config: &Config, yes: bool) -> Result<()> {
    let mut vault = open_vault(config)?;
    if !vault.has_stored_secret() {
        println!("No API key stored. Nothing to remove.");
        return Ok(());
    }

    if !confirm(REMOVE_KEY_QUESTION, yes)? {
        println!("Aborted. The stored key was kept.");
        return Ok(());
    }

    vault.clear()?;
    println!("Stored key removed.");
    Ok(())
}

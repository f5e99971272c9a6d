//! Config command implementation
//!
//! Handles `clara config`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::Config;

#[derive(Debug, Serialize)]
struct ConfigEntryJson {
    value: String,
    source: String,
}

/// Execute the config command
pub fn execute_config_command(config: &Config, json: bool) -> Result<()> {
    // Sorted for stable output
    let effective: BTreeMap<String, (String, String)> =
        config.effective_config().into_iter().collect();

    if json {
        let output: BTreeMap<String, ConfigEntryJson> = effective
            .into_iter()
            .map(|(key, (value, source))| (key, ConfigEntryJson { value, source }))
            .collect();
        let rendered = serde_json::to_string_pretty(&output).context("Failed to emit config JSON")?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Effective configuration:");
    for (key, (value, source)) in &effective {
        println!("  {key} = {value} [{source}]");
    }
    Ok(())
}

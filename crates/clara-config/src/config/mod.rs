//! Configuration management for clara
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > environment > file > defaults. Supports TOML configuration files with
//! `[defaults]`, `[backend]` and `[vault]` sections.

mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use cli_args::CliArgs;
pub use model::*;

use camino::Utf8PathBuf;

impl Config {
    /// Knowledge-base server base URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.backend
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    /// Location of the vault record file.
    #[must_use]
    pub fn vault_path(&self) -> Utf8PathBuf {
        match &self.vault.path {
            Some(path) => Utf8PathBuf::from(path),
            None => clara_utils::paths::vault_record_path(),
        }
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Config {
    /// Create a minimal Config for testing purposes, bypassing discovery.
    pub fn minimal_for_testing() -> Self {
        Config {
            defaults: Defaults::default(),
            backend: BackendConfig::default(),
            vault: VaultConfig::default(),
            source_attribution: std::collections::HashMap::new(),
        }
    }
}

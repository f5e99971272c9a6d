use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Base URL of the knowledge-base server when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Environment variable overriding `[backend] base_url`.
pub const BACKEND_URL_ENV: &str = "CLARA_BACKEND_URL";

/// Configuration for clara operations.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > environment > config file > built-in defaults.
///
/// # Discovery
///
/// Use [`Config::discover()`] for CLI-like behavior that:
/// - Searches for `.clara/config.toml` upward from the current directory
/// - Honors `CLARA_BACKEND_URL` for the backend base URL
/// - Applies built-in defaults for unspecified values
///
/// # Source Attribution
///
/// Each configuration value tracks where it came from, reported by
/// [`Config::effective_config()`] for `clara config`.
///
/// # Example
///
/// ```rust,no_run
/// use clara_config::{CliArgs, Config};
///
/// let config = Config::discover(&CliArgs::default())?;
/// println!("Backend: {}", config.base_url());
/// println!("Vault: {}", config.vault_path());
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub backend: BackendConfig,
    pub vault: VaultConfig,
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub verbose: Option<bool>,
}

/// `[backend]` section.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
        }
    }
}

/// `[vault]` section. `path` unset means `<CLARA_HOME>/vault/encrypted_key`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VaultConfig {
    pub path: Option<String>,
}

/// Source of a configuration value for attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    Env(String),
    ConfigFile(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env(var) => write!(f, "environment ({var})"),
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}
